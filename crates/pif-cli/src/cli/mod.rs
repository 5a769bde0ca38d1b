//! CLI for the PIF profile image fetcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pif_core::config;
use pif_core::profile_store::ProfileDb;

use commands::{run_set_url, run_show};

/// Top-level CLI for the PIF profile image fetcher.
#[derive(Debug, Parser)]
#[command(name = "pif")]
#[command(about = "PIF: SSRF-hardened profile image fetcher", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a profile image from a trusted host and store it for a user.
    SetUrl {
        /// User the image belongs to.
        user: String,
        /// HTTP/HTTPS URL on an allowed image host.
        url: String,
    },

    /// Show the stored profile image reference for a user.
    Show {
        /// User to look up.
        user: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let db = ProfileDb::open_default().await?;

        match cli.command {
            CliCommand::SetUrl { user, url } => run_set_url(&db, &cfg, &user, &url).await?,
            CliCommand::Show { user } => run_show(&db, &user).await?,
        }

        Ok(())
    }
}
