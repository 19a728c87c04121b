//! # Charwright - Character Builder
//!
//! The main binary for the Charwright rules engine.
//!
//! This application provides:
//! - CLI interface for catalogs, derivation, wizard replay and random characters
//! - HTTP REST API server (axum-based)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    apps/charwright (THE BINARY)                 │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   HTTP API  │    │  Loader / Saver  │    │
//! │  │  (clap)     │    │   (axum)    │    │ (tokio, reqwest) │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                  ┌──────────────────┐                          │
//! │                  │ charwright-core  │                          │
//! │                  │   (THE RULES)    │                          │
//! │                  └──────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! charwright --catalog ./catalog server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! charwright catalog
//! charwright random --seed 7 --out hero.json
//! charwright derive -s selection.json
//! charwright walk -s selection.json
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // CHARWRIGHT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CHARWRIGHT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "charwright=info,charwright_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Charwright startup banner.
fn print_banner() {
    println!(
        r#"
  ╔═══════════════════════════════════════╗
  ║   C H A R W R I G H T                 ║
  ╚═══════════════════════════════════════╝

  Character Builder v{}

  Derive • Validate • Generate
"#,
        env!("CARGO_PKG_VERSION")
    );
}
