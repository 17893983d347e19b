//! TruthLens CLI
//!
//! Host harness for the notification pipeline and the verdict overlay.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use truth_lens::{
    cli::{handle_overlay, handle_parse, handle_replay, OverlayArgs, ParseArgs, ReplayArgs},
    LensConfig, LensService,
};

#[derive(Parser)]
#[command(name = "lens")]
#[command(about = "TruthLens - gig order notification parser and verdict overlay")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/truth-lens/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract an offer from one notification text
    Parse(ParseArgs),
    /// Run JSON-lines notification events through the dispatcher
    Replay(ReplayArgs),
    /// Show JSON-lines verdicts on the terminal overlay
    Overlay(OverlayArgs),
    /// Print the OS event subscription
    Registration,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity, e.g. RUST_LOG=debug lens replay
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("truth_lens=info,lens=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => LensConfig::load_from(path)?,
        None => LensConfig::load()?,
    };

    match cli.command {
        Commands::Parse(args) => handle_parse(args)?,
        Commands::Replay(args) => handle_replay(args, &config).await?,
        Commands::Overlay(args) => handle_overlay(args, &config).await?,
        Commands::Registration => {
            let registration = LensService::new(&config).connect();
            println!("{}", serde_json::to_string_pretty(&registration)?);
        }
    }

    Ok(())
}
