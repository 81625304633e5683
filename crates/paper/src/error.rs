//! CLI error types.

use paper_config::ConfigError;
use paper_markup::MarkupError;
use paper_publish::{BuildError, RootError};
use paper_vcs::SyncError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Root(#[from] RootError),

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("{0}")]
    Markup(#[from] MarkupError),

    #[error("{0}")]
    Build(#[from] BuildError),
}
