//! [`Vcs`] backend running the `git` command-line tool.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::vcs::{Vcs, VcsError};

/// Runs `git` subcommands from a repository root.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    program: OsString,
}

impl GitCli {
    /// Create a backend operating on the repository at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            program: OsString::from("git"),
        }
    }

    /// Use a different git executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    fn command_line(&self, args: &[&OsStr]) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(args.iter().copied())
            .map(OsStr::to_string_lossy)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run git with `args`, capturing output and failing on non-zero exit.
    fn run(&self, args: &[&OsStr]) -> Result<Output, VcsError> {
        let command = self.command_line(args);
        tracing::info!(command = %command, cwd = %self.root.display(), "Running git");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| VcsError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(VcsError::Failed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(output)
    }
}

impl Vcs for GitCli {
    fn list_remotes(&self) -> Result<Vec<String>, VcsError> {
        let output = self.run(&[OsStr::new("remote")])?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .map(str::to_owned)
            .collect())
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<(), VcsError> {
        self.run(&[
            OsStr::new("remote"),
            OsStr::new("add"),
            OsStr::new(name),
            OsStr::new(url),
        ])?;
        Ok(())
    }

    fn fetch(&self, remote: &str) -> Result<(), VcsError> {
        self.run(&[OsStr::new("fetch"), OsStr::new(remote)])?;
        Ok(())
    }

    fn checkout_path(&self, worktree: &Path, rev: &str, path: &str) -> Result<(), VcsError> {
        let mut work_tree = OsString::from("--work-tree=");
        work_tree.push(worktree);
        self.run(&[
            work_tree.as_os_str(),
            OsStr::new("checkout"),
            OsStr::new(rev),
            OsStr::new("--"),
            OsStr::new(path),
        ])?;
        Ok(())
    }

    fn unstage(&self) -> Result<(), VcsError> {
        self.run(&[OsStr::new("reset")])?;
        Ok(())
    }
}
