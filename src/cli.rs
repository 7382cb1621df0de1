//! CLI glue for forge-harvest: argument parsing and the async [`run`]
//! entrypoint shared by `main()` and the integration tests.
//!
//! All pipeline logic lives in [`crate::harvest`]; this module only loads the
//! config, applies command-line overrides, wires the real client and sink
//! together and reports the outcome.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::ForgeClient;
use crate::harvest::harvest;
use crate::load_config::load_config;
use crate::writer::CsvSink;

/// CLI for forge-harvest: collect users and repositories into CSV datasets.
#[derive(Parser)]
#[clap(
    name = "forge-harvest",
    version,
    about = "Harvest GitHub users matching a location and follower threshold, with their repositories, into CSV files"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search, fetch and write both datasets using the given config file
    Harvest {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,

        /// Override search.location from the config file
        #[clap(long)]
        location: Option<String>,

        /// Override search.min_followers from the config file
        #[clap(long)]
        min_followers: Option<u64>,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Harvest {
            config: config_path,
            location,
            min_followers,
        } => {
            let mut config = load_config(&config_path)
                .with_context(|| format!("Failed to load config {}", config_path.display()))?;
            if let Some(location) = location {
                config.search.location = location;
            }
            if let Some(min_followers) = min_followers {
                config.search.min_followers = min_followers;
            }

            tracing::info!(
                command = "harvest",
                query = %config.search.query(),
                "Starting harvest"
            );
            let client = ForgeClient::new(&config.api).context("Failed to construct API client")?;
            let sink = CsvSink::new(&config.output);

            match harvest(&config, &client, &sink).await {
                Ok(report) => {
                    tracing::info!(command = "harvest", ?report, "Harvest complete");
                    println!(
                        "Harvest complete: {} users ({} skipped) -> {}, {} repositories -> {}",
                        report.users_written,
                        report.skipped_logins.len(),
                        report.users_path.display(),
                        report.repositories_written,
                        report.repositories_path.display(),
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "harvest", error = %e, "Harvest failed");
                    Err(anyhow::Error::new(e).context("Harvest failed"))
                }
            }
        }
    }
}
