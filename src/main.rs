// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Apply {
            manifest,
            snapshot,
            root,
            cache_dir,
            tool,
            dry_run,
        }) => commands::apply(&manifest, &snapshot, &root, &cache_dir, &tool, dry_run),
        Some(Commands::Status { manifest, snapshot }) => commands::status(&manifest, &snapshot),
        Some(Commands::Validate { manifest }) => commands::validate(&manifest),
        None => {
            // No command provided, show help
            println!("Remedy Patch Orchestrator v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'remedy --help' for usage information");
            Ok(())
        }
    }
}
