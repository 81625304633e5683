//! Paper rebuild CLI.
//!
//! Rebuilds one paper of the proceedings repository:
//! - optionally mirrors editable sources from the collaborative remote
//! - converts LaTeX sections to reStructuredText
//! - removes stale build output
//! - runs the publishing pipeline

mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::RebuildArgs;
use output::Output;

/// Paper - rebuild a paper through the publishing pipeline.
#[derive(Parser)]
#[command(name = "paper", version, about)]
struct Cli {
    #[command(flatten)]
    rebuild: RebuildArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.rebuild.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.rebuild.execute() {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
