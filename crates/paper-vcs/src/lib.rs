//! Version-control plumbing for the paper rebuild tool.
//!
//! This crate provides a [`Vcs`] trait covering the handful of operations the
//! rebuild needs (list and add remotes, fetch, path-scoped checkout, unstage)
//! so the orchestration can be tested without a real repository.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Vcs`] trait, one method per logical operation
//! - [`GitCli`] implementation shelling out to the `git` binary
//! - [`MockVcs`] recording test double (behind `mock` feature flag)
//! - [`RemoteSync`] mirroring a fixed path set from a collaborative remote
//!
//! # Example
//!
//! ```ignore
//! use paper_vcs::{GitCli, RemoteSync, SyncPlan};
//!
//! let git = GitCli::new("/repo");
//! let report = RemoteSync::new(&git, plan).run()?;
//! ```

mod git;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod sync;
mod vcs;

pub use git::GitCli;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockVcs, VcsCall, VcsOperation};
pub use sync::{RemoteSync, SyncError, SyncPlan, SyncReport};
pub use vcs::{Vcs, VcsError};
