//! Multi-tenant localized page server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                    SITEHOST                       │
//!   Client Request       │  ┌────────┐   ┌──────────┐   ┌───────────────┐   │
//!   ─────────────────────┼─▶│  http  │──▶│ routing  │──▶│ site registry │   │
//!                        │  │ server │   │ (domain) │   │  → handler    │   │
//!                        │  └────────┘   └──────────┘   └───────┬───────┘   │
//!                        │                                      │           │
//!   Client Response      │  ┌──────────┐   ┌────────────────────▼───────┐   │
//!   ◀────────────────────┼──│ response │◀──│ published serving table    │   │
//!                        │  └──────────┘   │ (path, language) → HTML    │   │
//!                        │                 └────────────▲───────────────┘   │
//!                        │                              │ rebuild           │
//!                        │  ┌────────┐   ┌──────────────┴──────────────┐    │
//!   config file ─────────┼─▶│ config │──▶│ pages + translations + menu │    │
//!                        │  │watcher │   │ → render (every language)   │    │
//!                        │  └────────┘   └─────────────────────────────┘    │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use sitehost::lifecycle::startup::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "sitehost")]
#[command(about = "Serve localized pages for many tenants from one process", long_about = None)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the configuration file when it changes.
    #[arg(short, long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    startup::run(StartupOptions {
        config_path: cli.config,
        watch: cli.watch,
    })
    .await?;
    Ok(())
}
