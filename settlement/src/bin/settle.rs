//! Settle a tab snapshot from the command line

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tab_settlement::{Config, SettlementEngine, Snapshot};

/// Compute balances and settlement transfers for a snapshot file.
#[derive(Parser, Debug)]
#[command(name = "tab-settle")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON snapshot with `participants` and `expenses`
    snapshot: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env().context("applying environment overrides")?;

    let content = std::fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("reading snapshot {}", cli.snapshot.display()))?;
    let snapshot = Snapshot::from_json(&content)
        .with_context(|| format!("parsing snapshot {}", cli.snapshot.display()))?;

    tracing::info!(
        participants = snapshot.participants.len(),
        expenses = snapshot.expenses.len(),
        "Snapshot loaded"
    );

    let engine = SettlementEngine::new(config)?;
    let report = engine.settle(&snapshot)?;

    let output = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", output);

    Ok(())
}
