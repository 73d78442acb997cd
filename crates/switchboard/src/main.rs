//! Switchboard bot binary.
//!
//! ```bash
//! SWITCHBOARD_TELEGRAM__TOKEN=123:abc switchboard --profile production
//! switchboard --config ./switchboard.toml --check
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use switchboard::runtime::{COMMANDS, SwitchboardRuntime};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "switchboard", version, about)]
struct Cli {
    /// Configuration file to load instead of searching for `switchboard.toml`.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Configuration profile. Defaults to `SWITCHBOARD_PROFILE`, then development.
    #[arg(short, long)]
    profile: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = SwitchboardRuntime::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &cli.profile {
        builder = builder.profile(profile);
    }

    if cli.check {
        let config = builder.load_config().context("invalid configuration")?;
        println!("Configuration OK");
        println!("  api url:    {}", config.telegram.api_url);
        println!("  data dir:   {}", config.capabilities.data_dir.display());
        println!("  commands:   {}", COMMANDS.len());
        return Ok(());
    }

    let runtime = builder.build().await.context("failed to start")?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting Switchboard");
    runtime.run().await?;
    Ok(())
}
