//! Stale build output removal.

use std::path::Path;

use crate::builder::BuildError;

/// Delete `output_dir` recursively if it exists.
///
/// Returns `true` if something was removed.
pub fn clean_output(output_dir: &Path) -> Result<bool, BuildError> {
    if !output_dir.exists() {
        return Ok(false);
    }
    tracing::info!(dir = %output_dir.display(), "Removing existing output directory");
    std::fs::remove_dir_all(output_dir).map_err(|source| BuildError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;
    Ok(true)
}
