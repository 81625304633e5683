//! Repository root discovery.

use std::path::{Component, Path, PathBuf};

/// Error while locating the repository root.
#[derive(Debug, thiserror::Error)]
pub enum RootError {
    /// No ancestor of the paper directory carries the VCS marker.
    #[error("no '{marker}' found in {} or any parent directory", start.display())]
    NoRepository {
        /// Directory the search started from.
        start: PathBuf,
        /// Marker that was searched for.
        marker: String,
    },

    /// The located root does not host the publishing pipeline.
    #[error("invalid root found: {} has no '{publisher}' directory", root.display())]
    MissingPublisher {
        /// Located root.
        root: PathBuf,
        /// Expected publisher directory.
        publisher: String,
    },

    /// The paper directory could not be resolved.
    #[error("cannot resolve {}: {source}", path.display())]
    Io {
        /// Path being resolved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A paper directory together with the repository root above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRoot {
    root: PathBuf,
    paper_dir: PathBuf,
    relpath: PathBuf,
}

impl PaperRoot {
    /// Walk up from `paper_dir` to the first directory containing `vcs_marker`.
    ///
    /// The located root must contain `publisher_dir`.
    pub fn locate(
        paper_dir: &Path,
        vcs_marker: &str,
        publisher_dir: &str,
    ) -> Result<Self, RootError> {
        let paper_dir = std::fs::canonicalize(paper_dir).map_err(|source| RootError::Io {
            path: paper_dir.to_path_buf(),
            source,
        })?;

        let root = paper_dir
            .ancestors()
            .find(|dir| dir.join(vcs_marker).exists())
            .ok_or_else(|| RootError::NoRepository {
                start: paper_dir.clone(),
                marker: vcs_marker.to_owned(),
            })?
            .to_path_buf();

        if !root.join(publisher_dir).is_dir() {
            return Err(RootError::MissingPublisher {
                root,
                publisher: publisher_dir.to_owned(),
            });
        }

        let relpath = paper_dir
            .strip_prefix(&root)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let relpath = if relpath.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            relpath
        };

        tracing::info!(root = %root.display(), "Found root");
        Ok(Self {
            root,
            paper_dir,
            relpath,
        })
    }

    /// Repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute paper directory.
    #[must_use]
    pub fn paper_dir(&self) -> &Path {
        &self.paper_dir
    }

    /// Paper directory relative to the root.
    #[must_use]
    pub fn relpath(&self) -> &Path {
        &self.relpath
    }

    /// Relative paper path with `/` separators, as handed to the pipeline.
    ///
    /// A paper at the repository root is passed as `.`.
    #[must_use]
    pub fn relpath_arg(&self) -> String {
        let parts: Vec<_> = self
            .relpath
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            ".".to_owned()
        } else {
            parts.join("/")
        }
    }

    /// Build output directory of `paper_id` under `output_dir`.
    #[must_use]
    pub fn output_dir(&self, output_dir: &str, paper_id: &str) -> PathBuf {
        self.root.join(output_dir).join(paper_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn repo() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::create_dir_all(temp.path().join("publisher")).unwrap();
        fs::create_dir_all(temp.path().join("papers/221_jessurun/sections")).unwrap();
        temp
    }

    #[test]
    fn test_locate_walks_up_to_marker() {
        let temp = repo();
        let root = fs::canonicalize(temp.path()).unwrap();

        let located =
            PaperRoot::locate(&temp.path().join("papers/221_jessurun"), ".git", "publisher")
                .unwrap();

        assert_eq!(located.root(), root);
        assert_eq!(located.paper_dir(), root.join("papers/221_jessurun"));
        assert_eq!(located.relpath(), Path::new("papers/221_jessurun"));
        assert_eq!(located.relpath_arg(), "papers/221_jessurun");
        assert_eq!(
            located.output_dir("output", "221_jessurun"),
            root.join("output/221_jessurun")
        );
    }

    #[test]
    fn test_locate_accepts_marker_file() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(".git"), "gitdir: /elsewhere").unwrap();
        fs::create_dir_all(temp.path().join("publisher")).unwrap();
        fs::create_dir_all(temp.path().join("p")).unwrap();

        let located = PaperRoot::locate(&temp.path().join("p"), ".git", "publisher").unwrap();
        assert_eq!(located.relpath_arg(), "p");
    }

    #[test]
    fn test_locate_missing_publisher() {
        let temp = repo();
        fs::remove_dir(temp.path().join("publisher")).unwrap();

        let err = PaperRoot::locate(&temp.path().join("papers/221_jessurun"), ".git", "publisher")
            .unwrap_err();

        assert!(matches!(err, RootError::MissingPublisher { .. }));
        assert!(err.to_string().starts_with("invalid root found"));
    }

    #[test]
    fn test_locate_without_marker() {
        let temp = tempfile::tempdir().unwrap();
        let err = PaperRoot::locate(temp.path(), ".paper-test-marker-absent", "publisher")
            .unwrap_err();
        assert!(matches!(err, RootError::NoRepository { .. }));
    }

    #[test]
    fn test_locate_missing_paper_dir() {
        let temp = repo();
        let err = PaperRoot::locate(&temp.path().join("papers/nope"), ".git", "publisher")
            .unwrap_err();
        assert!(matches!(err, RootError::Io { .. }));
    }

    #[test]
    fn test_paper_dir_at_root() {
        let temp = repo();
        let located = PaperRoot::locate(temp.path(), ".git", "publisher").unwrap();
        assert_eq!(located.relpath(), Path::new("."));
        assert_eq!(located.relpath_arg(), ".");
    }
}
