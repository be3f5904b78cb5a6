//! # capsync
//!
//! Sync PDF captures from the local captures folder into the capture store.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `capsync init` | Create the SQLite tables if missing |
//! | `capsync sync --site <site> --date <date>` | Reconcile one capture folder |
//! | `capsync stats --site <site>` | Show capture counts and mapping health |
//!
//! ## Examples
//!
//! ```bash
//! capsync init --config ./config/capsync.toml
//! capsync sync --site trans-allegheny --date 2026-02-16 --dry-run
//! capsync sync --site trans-allegheny --date 2026-02-16
//! capsync stats --site trans-allegheny
//! ```

use capture_sync::progress::ProgressMode;
use capture_sync::{config, logging, migrate, stats, sync};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// capsync: reconcile local PDF captures with the capture store.
#[derive(Parser)]
#[command(
    name = "capsync",
    about = "Reconcile local PDF captures with the capture store",
    version,
    long_about = "Hashes every PDF in <captures-root>/<site>/<date>/, resolves it to a catalog \
    document through the site's mapping.json (asking when a file is unknown), and upserts one \
    capture row per (document, content hash). Safe to re-run."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/capsync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the sites, documents and captures tables if they are missing.
    ///
    /// Idempotent. Does not create any site or document rows.
    Init,

    /// Sync one capture folder into the capture store.
    Sync {
        /// Site folder name, e.g. `trans-allegheny`.
        #[arg(long)]
        site: String,

        /// Date folder, e.g. `2026-02-16`.
        #[arg(long)]
        date: String,

        /// Resolve and hash everything but write no captures.
        /// Mapping choices made at the prompt are still saved.
        #[arg(long)]
        dry_run: bool,

        /// Keep going when a capture cannot be written.
        #[arg(long)]
        keep_going: bool,

        /// Progress output on stderr. Defaults to `human` on a terminal.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Show captures per document and mapping health for a site.
    Stats {
        /// Site folder name.
        #[arg(long)]
        site: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sync {
            site,
            date,
            dry_run,
            keep_going,
            progress,
        } => {
            let progress = progress.unwrap_or_else(ProgressMode::default_for_tty);
            sync::run_sync(&cfg, &site, &date, dry_run, keep_going, progress).await?;
        }
        Commands::Stats { site } => {
            stats::run_stats(&cfg, &site).await?;
        }
    }

    Ok(())
}
