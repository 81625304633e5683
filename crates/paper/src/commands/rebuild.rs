//! Paper rebuild command implementation.

use std::path::PathBuf;

use clap::Args;
use paper_config::{CliSettings, Config};
use paper_markup::{RuleSet, convert_sections, sanitize_figures};
use paper_publish::{BuildInvoker, PaperRoot, clean_output};
use paper_vcs::{GitCli, RemoteSync, SyncPlan, Vcs};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the rebuild.
#[derive(Args)]
pub(crate) struct RebuildArgs {
    /// Mirror figures, sections and bibliography from the collaborative remote first.
    #[arg(long, alias = "sync-overleaf")]
    pub(crate) sync_remote: bool,

    /// Paper directory (default: current directory).
    #[arg(long, env = "PAPER_DIR")]
    pub(crate) paper_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover paper.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Enable verbose output (show INFO logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RebuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            paper_dir: self.paper_dir.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let root = PaperRoot::locate(
            &config.paper_resolved.dir,
            &config.build.vcs_marker,
            &config.build.publisher_dir,
        )?;
        output.info(&format!("Found root: {}", root.root().display()));

        let git = GitCli::new(root.root());
        rebuild(&config, &root, &git, self.sync_remote, &output)
    }
}

/// Run every rebuild step in order, stopping at the first failure.
fn rebuild<V: Vcs + ?Sized>(
    config: &Config,
    root: &PaperRoot,
    vcs: &V,
    sync_remote: bool,
    output: &Output,
) -> Result<(), CliError> {
    tracing::info!(
        paper = %config.paper_resolved.id,
        root = %root.root().display(),
        sync_remote,
        "Rebuilding paper"
    );

    if sync_remote {
        let plan = SyncPlan {
            remote: config.sync.remote.clone(),
            url_env: config.sync.url_env.clone(),
            branch: config.sync.branch.clone(),
            paths: config.sync.paths.clone(),
            paper_dir: root.paper_dir().to_path_buf(),
            worktree: root.relpath().to_path_buf(),
        };
        let tracking_ref = plan.tracking_ref();
        tracing::info!(remote = %tracking_ref, paths = plan.paths.len(), "Syncing from remote");
        let report = RemoteSync::new(vcs, plan).run()?;
        if report.remote_added {
            output.info(&format!("Added remote '{}'", config.sync.remote));
        }
        output.success(&format!(
            "Mirrored {} from {}",
            report.mirrored.join(", "),
            tracking_ref
        ));
    }

    let markup = &config.markup_resolved;
    let converted = convert_sections(RuleSet::standard(), &markup.sections_dir, &markup.output_dir)?;
    if converted.is_empty() {
        output.warning(&format!(
            "No sections found in {}",
            markup.sections_dir.display()
        ));
    } else {
        output.info(&format!(
            "Converted {} sections to {}",
            converted.len(),
            markup.output_dir.display()
        ));
    }
    let sanitized = sanitize_figures(&markup.figures_file, &markup.sanitized_figures_name)?;
    tracing::info!(path = %sanitized.display(), "Sanitized figures file");

    let output_dir = root.output_dir(&config.build.output_dir, &config.paper_resolved.id);
    if clean_output(&output_dir)? {
        output.info(&format!("Removed {}", output_dir.display()));
    }

    tracing::info!(script = %config.build.script, "Invoking build");
    BuildInvoker::new(&config.build.interpreter, &config.build.script).run(root, vcs)?;
    output.success(&format!("Paper {} built", config.paper_resolved.id));
    Ok(())
}
