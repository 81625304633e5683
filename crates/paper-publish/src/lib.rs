//! Publishing side of a paper rebuild.
//!
//! - [`PaperRoot`] locates the repository root above a paper directory
//! - [`clean_output`] removes stale build output
//! - [`BuildInvoker`] runs the external publishing pipeline

mod builder;
mod clean;
mod root;

pub use builder::{BuildError, BuildInvoker};
pub use clean::clean_output;
pub use root::{PaperRoot, RootError};
