//! Bandi CLI - Extract structured records from grant notices.

use anyhow::Context;
use bandi_cli::commands;
use bandi_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Azure credentials and RUST_LOG may live in a .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load or create config
    let config_path = match &cli.config {
        Some(path) => PathBuf::from(path),
        None => Config::path()?,
    };
    let mut config = Config::load_or_init(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    // Override profile if specified
    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Locate(args) => {
            commands::execute_locate(args, &config, &formatter).await?;
        }
        Command::Extract(args) => {
            commands::execute_extract(args, &config, &formatter).await?;
        }
        Command::Show(args) => {
            commands::execute_show(args, &config, &formatter).await?;
        }
        Command::Profile(args) => {
            commands::execute_profile(args, &mut config, &formatter).await?;
        }
    }

    Ok(())
}
