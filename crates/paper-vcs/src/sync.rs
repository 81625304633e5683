//! One-way mirror of editable paper content from a collaborative remote.
//!
//! Co-authors edit figures, sections and bibliography on a git-backed
//! collaborative store. The sync registers that store as a remote if needed,
//! fetches it, and force-restores a fixed set of paths into the paper
//! directory. Local edits to those paths are always discarded.

use std::path::{Path, PathBuf};

use crate::vcs::{Vcs, VcsError};

/// Environment lookup used to resolve the remote URL.
type EnvLookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

/// What to mirror and where from.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Remote name.
    pub remote: String,
    /// Environment variable holding the remote URL.
    pub url_env: String,
    /// Branch of the remote that is mirrored.
    pub branch: String,
    /// Paths mirrored, relative to the paper directory.
    pub paths: Vec<String>,
    /// Absolute paper directory.
    pub paper_dir: PathBuf,
    /// Paper directory relative to the repository root.
    pub worktree: PathBuf,
}

impl SyncPlan {
    /// Remote-tracking revision mirrored paths are restored from.
    #[must_use]
    pub fn tracking_ref(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }
}

/// Summary of a completed sync.
#[derive(Debug, PartialEq, Eq)]
pub struct SyncReport {
    /// Whether the remote had to be registered.
    pub remote_added: bool,
    /// Paths restored from the remote, in order.
    pub mirrored: Vec<String>,
}

/// Error during remote sync.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote is not registered and its URL variable is unset.
    #[error("remote '{remote}' is not configured and ${variable} is not set")]
    MissingRemoteUrl {
        /// Remote name.
        remote: String,
        /// Environment variable that should hold the URL.
        variable: String,
    },

    /// A version-control command failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),

    /// Removing a local copy before restoring it failed.
    #[error("failed to remove {}: {source}", path.display())]
    Io {
        /// Path being removed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Mirrors [`SyncPlan::paths`] from the remote into the paper directory.
pub struct RemoteSync<'a, V: Vcs + ?Sized> {
    vcs: &'a V,
    plan: SyncPlan,
    env: EnvLookup<'a>,
}

impl<'a, V: Vcs + ?Sized> RemoteSync<'a, V> {
    /// Create a sync reading the remote URL from the process environment.
    pub fn new(vcs: &'a V, plan: SyncPlan) -> Self {
        Self {
            vcs,
            plan,
            env: Box::new(|name: &str| std::env::var(name).ok()),
        }
    }

    /// Replace the environment lookup.
    #[must_use]
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        self.env = Box::new(lookup);
        self
    }

    /// Ensure the remote, fetch it, then mirror every path.
    ///
    /// Stops at the first failure; paths mirrored before it stay mirrored.
    pub fn run(&self) -> Result<SyncReport, SyncError> {
        let remote_added = self.ensure_remote()?;
        self.fetch()?;
        let mirrored = self.mirror_paths()?;
        Ok(SyncReport {
            remote_added,
            mirrored,
        })
    }

    /// Register the remote unless it already exists.
    ///
    /// Returns `true` if the remote was added.
    pub fn ensure_remote(&self) -> Result<bool, SyncError> {
        let remotes = self.vcs.list_remotes()?;
        if remotes.iter().any(|r| *r == self.plan.remote) {
            return Ok(false);
        }

        let url = (self.env)(&self.plan.url_env)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| SyncError::MissingRemoteUrl {
                remote: self.plan.remote.clone(),
                variable: self.plan.url_env.clone(),
            })?;

        tracing::info!(remote = %self.plan.remote, url = %url, "Remote not configured, adding it");
        self.vcs.add_remote(&self.plan.remote, &url)?;
        Ok(true)
    }

    /// Fetch the remote without merging.
    pub fn fetch(&self) -> Result<(), SyncError> {
        self.vcs.fetch(&self.plan.remote)?;
        Ok(())
    }

    /// Replace each mirrored path with its remote version.
    pub fn mirror_paths(&self) -> Result<Vec<String>, SyncError> {
        let rev = self.plan.tracking_ref();
        let mut mirrored = Vec::with_capacity(self.plan.paths.len());
        for path in &self.plan.paths {
            remove_local(&self.plan.paper_dir.join(path))?;
            self.vcs.checkout_path(&self.plan.worktree, &rev, path)?;
            mirrored.push(path.clone());
        }
        Ok(mirrored)
    }
}

/// Delete a file or directory tree if present.
fn remove_local(path: &Path) -> Result<(), SyncError> {
    let Ok(metadata) = std::fs::symlink_metadata(path) else {
        return Ok(());
    };
    let result = if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Removed local copy");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockVcs, VcsCall, VcsOperation};
    use pretty_assertions::assert_eq;
    use std::fs;

    const REMOTE_URL: &str = "git@example.com:user/repo.git";

    fn plan(paper_dir: &Path) -> SyncPlan {
        SyncPlan {
            remote: "overleaf".to_owned(),
            url_env: "OVERLEAF_CURRENT_REPO".to_owned(),
            branch: "master".to_owned(),
            paths: vec!["figures".to_owned(), "main.tex".to_owned()],
            paper_dir: paper_dir.to_path_buf(),
            worktree: PathBuf::from("papers/221_jessurun"),
        }
    }

    fn env_with_url(name: &str) -> Option<String> {
        (name == "OVERLEAF_CURRENT_REPO").then(|| REMOTE_URL.to_owned())
    }

    #[test]
    fn test_adds_missing_remote_before_fetch() {
        let temp = tempfile::tempdir().unwrap();
        let vcs = MockVcs::new().with_remote("origin");

        let report = RemoteSync::new(&vcs, plan(temp.path()))
            .with_env_lookup(env_with_url)
            .run()
            .unwrap();

        assert!(report.remote_added);
        let calls = vcs.calls();
        assert_eq!(
            calls[..3].to_vec(),
            vec![
                VcsCall::ListRemotes,
                VcsCall::AddRemote {
                    name: "overleaf".to_owned(),
                    url: REMOTE_URL.to_owned(),
                },
                VcsCall::Fetch {
                    remote: "overleaf".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_url_fails_before_network() {
        let temp = tempfile::tempdir().unwrap();
        let vcs = MockVcs::new();

        let err = RemoteSync::new(&vcs, plan(temp.path()))
            .with_env_lookup(|_| None)
            .run()
            .unwrap_err();

        assert!(matches!(err, SyncError::MissingRemoteUrl { .. }));
        assert!(err.to_string().contains("OVERLEAF_CURRENT_REPO"));
        assert_eq!(vcs.calls(), vec![VcsCall::ListRemotes]);
    }

    #[test]
    fn test_empty_url_counts_as_unset() {
        let temp = tempfile::tempdir().unwrap();
        let vcs = MockVcs::new();
        let err = RemoteSync::new(&vcs, plan(temp.path()))
            .with_env_lookup(|_| Some(String::new()))
            .ensure_remote()
            .unwrap_err();
        assert!(matches!(err, SyncError::MissingRemoteUrl { .. }));
    }

    #[test]
    fn test_existing_remote_skips_env_lookup() {
        let temp = tempfile::tempdir().unwrap();
        let vcs = MockVcs::new().with_remote("overleaf");

        let added = RemoteSync::new(&vcs, plan(temp.path()))
            .with_env_lookup(|name| panic!("unexpected lookup of {name}"))
            .ensure_remote()
            .unwrap();

        assert!(!added);
        assert_eq!(vcs.calls(), vec![VcsCall::ListRemotes]);
    }

    #[test]
    fn test_mirror_replaces_local_copies() {
        let temp = tempfile::tempdir().unwrap();
        let figures = temp.path().join("figures");
        fs::create_dir_all(figures.join("nested")).unwrap();
        fs::write(figures.join("nested/local.png"), "local").unwrap();
        fs::write(temp.path().join("main.tex"), "local edits").unwrap();
        let vcs = MockVcs::new().with_remote("overleaf");

        let mirrored = RemoteSync::new(&vcs, plan(temp.path()))
            .mirror_paths()
            .unwrap();

        assert_eq!(mirrored, vec!["figures", "main.tex"]);
        assert!(!figures.exists());
        assert!(!temp.path().join("main.tex").exists());
        assert_eq!(
            vcs.calls(),
            vec![
                VcsCall::CheckoutPath {
                    worktree: PathBuf::from("papers/221_jessurun"),
                    rev: "overleaf/master".to_owned(),
                    path: "figures".to_owned(),
                },
                VcsCall::CheckoutPath {
                    worktree: PathBuf::from("papers/221_jessurun"),
                    rev: "overleaf/master".to_owned(),
                    path: "main.tex".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_mirror_without_local_copies() {
        let temp = tempfile::tempdir().unwrap();
        let vcs = MockVcs::new();
        let mirrored = RemoteSync::new(&vcs, plan(temp.path()))
            .mirror_paths()
            .unwrap();
        assert_eq!(mirrored.len(), 2);
    }

    #[test]
    fn test_fetch_failure_aborts_sync() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("main.tex"), "local edits").unwrap();
        let vcs = MockVcs::new()
            .with_remote("overleaf")
            .failing_on(VcsOperation::Fetch);

        let err = RemoteSync::new(&vcs, plan(temp.path())).run().unwrap_err();

        assert!(matches!(err, SyncError::Vcs(_)));
        assert!(temp.path().join("main.tex").exists());
        assert!(
            !vcs.calls()
                .iter()
                .any(|c| c.operation() == VcsOperation::CheckoutPath)
        );
    }

    #[test]
    fn test_checkout_failure_stops_at_first_path() {
        let temp = tempfile::tempdir().unwrap();
        let vcs = MockVcs::new()
            .with_remote("overleaf")
            .failing_on(VcsOperation::CheckoutPath);

        let err = RemoteSync::new(&vcs, plan(temp.path()))
            .mirror_paths()
            .unwrap_err();

        assert!(matches!(err, SyncError::Vcs(VcsError::Failed { .. })));
        assert_eq!(vcs.calls().len(), 1);
    }
}
