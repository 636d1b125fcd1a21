// src/cli.rs

//! CLI definitions for remedy
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "remedy")]
#[command(author = "Remedy Project")]
#[command(version)]
#[command(about = "Declarative patch orchestration for installed package trees", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve applicable patches and apply them
    Apply {
        /// Path to the patch manifest
        #[arg(short, long, default_value = "remedy.toml")]
        manifest: String,

        /// Path to the installed snapshot file
        #[arg(short, long, default_value = "installed.json")]
        snapshot: String,

        /// Directory packages are installed under
        #[arg(short, long, default_value = "vendor")]
        root: String,

        /// Directory for downloaded dist archives
        #[arg(long, default_value = ".remedy-cache")]
        cache_dir: String,

        /// Patch tool command; receives -p<precision> <filepath>
        #[arg(long, default_value = "git apply")]
        tool: String,

        /// Show what would be patched without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Show each patch's applicability against the installed snapshot
    Status {
        /// Path to the patch manifest
        #[arg(short, long, default_value = "remedy.toml")]
        manifest: String,

        /// Path to the installed snapshot file
        #[arg(short, long, default_value = "installed.json")]
        snapshot: String,
    },

    /// Parse and validate the patch manifest
    Validate {
        /// Path to the patch manifest
        #[arg(short, long, default_value = "remedy.toml")]
        manifest: String,
    },
}
