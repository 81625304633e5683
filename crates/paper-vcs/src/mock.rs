//! Mock version control for testing.
//!
//! Provides [`MockVcs`] for unit testing without a repository or network.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::vcs::{Vcs, VcsError};

/// Logical operation of the [`Vcs`] trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsOperation {
    /// [`Vcs::list_remotes`].
    ListRemotes,
    /// [`Vcs::add_remote`].
    AddRemote,
    /// [`Vcs::fetch`].
    Fetch,
    /// [`Vcs::checkout_path`].
    CheckoutPath,
    /// [`Vcs::unstage`].
    Unstage,
}

/// A recorded call on [`MockVcs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    /// `list_remotes()`.
    ListRemotes,
    /// `add_remote(name, url)`.
    AddRemote {
        /// Remote name.
        name: String,
        /// Remote URL.
        url: String,
    },
    /// `fetch(remote)`.
    Fetch {
        /// Remote name.
        remote: String,
    },
    /// `checkout_path(worktree, rev, path)`.
    CheckoutPath {
        /// Work tree relative to the repository root.
        worktree: PathBuf,
        /// Revision checked out.
        rev: String,
        /// Path restored.
        path: String,
    },
    /// `unstage()`.
    Unstage,
}

impl VcsCall {
    /// Operation this call belongs to.
    #[must_use]
    pub fn operation(&self) -> VcsOperation {
        match self {
            Self::ListRemotes => VcsOperation::ListRemotes,
            Self::AddRemote { .. } => VcsOperation::AddRemote,
            Self::Fetch { .. } => VcsOperation::Fetch,
            Self::CheckoutPath { .. } => VcsOperation::CheckoutPath,
            Self::Unstage => VcsOperation::Unstage,
        }
    }
}

/// Mock version control for testing.
///
/// Records every call and keeps registered remotes in memory. Use the
/// builder methods to configure remotes and injected failures.
///
/// # Example
///
/// ```ignore
/// use paper_vcs::{MockVcs, Vcs, VcsOperation};
///
/// let vcs = MockVcs::new()
///     .with_remote("origin")
///     .failing_on(VcsOperation::Fetch);
///
/// assert!(vcs.fetch("origin").is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockVcs {
    remotes: RwLock<Vec<String>>,
    calls: RwLock<Vec<VcsCall>>,
    failing: Option<VcsOperation>,
}

impl MockVcs {
    /// Create a mock with no remotes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already registered remote.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_remote(self, name: impl Into<String>) -> Self {
        self.remotes.write().unwrap().push(name.into());
        self
    }

    /// Make every call of `operation` fail.
    #[must_use]
    pub fn failing_on(mut self, operation: VcsOperation) -> Self {
        self.failing = Some(operation);
        self
    }

    /// Calls recorded so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.read().unwrap().clone()
    }

    /// Currently registered remotes.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn remotes(&self) -> Vec<String> {
        self.remotes.read().unwrap().clone()
    }

    fn record(&self, call: VcsCall) -> Result<(), VcsError> {
        let operation = call.operation();
        let command = format!("{call:?}");
        self.calls.write().unwrap().push(call);
        if self.failing == Some(operation) {
            return Err(VcsError::Failed {
                command,
                code: Some(1),
                stderr: "mock failure".to_owned(),
            });
        }
        Ok(())
    }
}

impl Vcs for MockVcs {
    fn list_remotes(&self) -> Result<Vec<String>, VcsError> {
        self.record(VcsCall::ListRemotes)?;
        Ok(self.remotes())
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<(), VcsError> {
        self.record(VcsCall::AddRemote {
            name: name.to_owned(),
            url: url.to_owned(),
        })?;
        self.remotes.write().unwrap().push(name.to_owned());
        Ok(())
    }

    fn fetch(&self, remote: &str) -> Result<(), VcsError> {
        self.record(VcsCall::Fetch {
            remote: remote.to_owned(),
        })
    }

    fn checkout_path(&self, worktree: &Path, rev: &str, path: &str) -> Result<(), VcsError> {
        self.record(VcsCall::CheckoutPath {
            worktree: worktree.to_path_buf(),
            rev: rev.to_owned(),
            path: path.to_owned(),
        })
    }

    fn unstage(&self) -> Result<(), VcsError> {
        self.record(VcsCall::Unstage)
    }
}
