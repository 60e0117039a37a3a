mod config;
mod report;
mod snapshot;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gaia-select", about = "Run one GAIA peer-selection round over a network snapshot")]
struct Cli {
    /// Network snapshot (JSON: nodes with neighbor gains and energies)
    #[arg(long, env = "GAIA_SNAPSHOT")]
    snapshot: PathBuf,

    /// Selector config (JSON, e.g. {"type": "random", "p": 0.3}).
    /// Defaults to the efficient selector.
    #[arg(long, env = "GAIA_SELECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for the efficient selector's initial weights
    #[arg(long)]
    seed: Option<u64>,

    /// Write the round report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::Config {
        selector: config::load_selector(cli.config.as_deref(), cli.seed)?,
        snapshot_path: cli.snapshot,
        output_path: cli.output,
    };
    tracing::info!(snapshot = %cfg.snapshot_path.display(), selector = ?cfg.selector, "Starting GAIA selection round");

    let snapshot = snapshot::Snapshot::load(&cfg.snapshot_path)?;
    let report = report::run_round(&snapshot, &cfg.selector)?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;

    match &cfg.output_path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            tracing::info!(path = %path.display(), summary = %report.summary, "Report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
