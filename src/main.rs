//! Layered CLI
//!
//! Command-line interface for combining and inspecting layered values.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use layered::cli::{commands, Cli, Commands};
use layered::LayeredConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Layered v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => LayeredConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LayeredConfig::default(),
    };

    let output = match cli.command {
        Commands::Combine { input, op, json } => commands::combine(&input, op, json, &config)?,
        Commands::Compare { input } => commands::compare(&input, &config)?,
        Commands::Summarize { input } => commands::summarize(&input, &config)?,
    };
    println!("{}", output);
    Ok(())
}
