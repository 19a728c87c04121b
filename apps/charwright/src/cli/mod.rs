//! # Charwright CLI Module
//!
//! This module implements the CLI interface for Charwright.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `catalog` - Show a summary of the loaded catalog
//! - `random` - Generate a random character
//! - `derive` - Derive stats and unlocked options for a selection file
//! - `walk` - Replay the build wizard over a selection file

mod commands;

use charwright::config::AppConfig;
use charwright_core::CharwrightError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Charwright - Character Builder
///
/// Composes characters from a catalog of species, body-part traits,
/// backgrounds, spells and gear.
#[derive(Parser, Debug)]
#[command(name = "charwright")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a charwright.toml configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog directory (overrides config and CHARWRIGHT_CATALOG_DIR)
    #[arg(short = 'C', long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Show catalog summary
    Catalog,

    /// Generate a random character
    Random {
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Send the character to the configured store
        #[arg(long)]
        save: bool,

        /// Write the character record to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Derive stats, cap warnings and unlocked options for a selection
    Derive {
        /// Path to a selection JSON file
        #[arg(short, long)]
        selection: PathBuf,
    },

    /// Replay the build wizard over a selection until a step rejects it
    Walk {
        /// Path to a selection JSON file
        #[arg(short, long)]
        selection: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CharwrightError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.catalog {
        config.catalog_dir = dir;
    }
    let json_mode = cli.json_mode;

    let catalog = load_catalog_or_fail(&config).await?;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(&config, catalog, &host, port).await,
        Some(Commands::Catalog) | None => cmd_catalog(&config, &catalog, json_mode),
        Some(Commands::Random { seed, save, out }) => {
            cmd_random(&config, catalog, json_mode, seed, save, out.as_deref()).await
        }
        Some(Commands::Derive { selection }) => cmd_derive(catalog, json_mode, &selection),
        Some(Commands::Walk { selection }) => cmd_walk(catalog, json_mode, &selection),
    }
}
