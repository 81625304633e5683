//! Version-control trait and error types.

use std::path::Path;

/// Version-control operations used by the rebuild.
///
/// Every method blocks until the underlying operation completed.
pub trait Vcs {
    /// Names of the configured remotes.
    fn list_remotes(&self) -> Result<Vec<String>, VcsError>;

    /// Register a remote named `name` pointing at `url`.
    fn add_remote(&self, name: &str, url: &str) -> Result<(), VcsError>;

    /// Download the latest state of `remote` without merging it.
    fn fetch(&self, remote: &str) -> Result<(), VcsError>;

    /// Force-restore `path` from `rev` into `worktree`.
    ///
    /// `worktree` is relative to the repository root and `path` is relative
    /// to `worktree`. Local changes to `path` are discarded.
    fn checkout_path(&self, worktree: &Path, rev: &str, path: &str) -> Result<(), VcsError>;

    /// Reset the index, undoing any staging done since the last commit.
    fn unstage(&self) -> Result<(), VcsError>;
}

/// Error from a version-control operation.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// The command could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// Command line that was attempted.
        command: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The command ran and reported failure.
    #[error("`{command}` failed with {}: {stderr}", describe_exit(*.code))]
    Failed {
        /// Command line that failed.
        command: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_owned(),
    }
}
