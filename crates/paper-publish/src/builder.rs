//! External publishing pipeline invocation.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use paper_vcs::Vcs;

use crate::root::PaperRoot;

/// Error returned by the build step.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The build process could not be started.
    #[error("failed to start build script {}: {source}", script.display())]
    Spawn {
        /// Script that was run.
        script: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The build process exited unsuccessfully.
    #[error("build script {} failed with {}", script.display(), describe_exit(*.code))]
    Failed {
        /// Script that was run.
        script: PathBuf,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
    },

    /// Filesystem error while preparing the build.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_owned(),
    }
}

/// Runs the publishing pipeline's build script for one paper.
#[derive(Debug, Clone)]
pub struct BuildInvoker {
    interpreter: OsString,
    script: PathBuf,
}

impl BuildInvoker {
    /// Create an invoker running `script` (relative to the root) with `interpreter`.
    pub fn new(interpreter: impl Into<OsString>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }

    /// Run the build from the repository root, then reset the index.
    ///
    /// The pipeline stages generated files as a side effect, so the index is
    /// always reset once the process exits. Failures of that reset are
    /// ignored. A non-zero exit of the build itself is reported after the
    /// reset.
    pub fn run<V: Vcs + ?Sized>(&self, root: &PaperRoot, vcs: &V) -> Result<(), BuildError> {
        let script = root.root().join(&self.script);
        let paper = root.relpath_arg();
        tracing::info!(
            interpreter = %self.interpreter.to_string_lossy(),
            script = %script.display(),
            paper = %paper,
            "Running build script"
        );

        let status = Command::new(&self.interpreter)
            .arg(&script)
            .arg(&paper)
            .current_dir(root.root())
            .status()
            .map_err(|source| BuildError::Spawn {
                script: script.clone(),
                source,
            })?;

        if let Err(e) = vcs.unstage() {
            tracing::debug!(error = %e, "Ignoring failed index reset");
        }

        if !status.success() {
            tracing::warn!(code = ?status.code(), "Build script failed");
            return Err(BuildError::Failed {
                script,
                code: status.code(),
            });
        }
        Ok(())
    }
}
