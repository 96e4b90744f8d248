//! # greywire CLI
//!
//! The command surface of the connector: one batch-run invocation. The IP list
//! comes from `--ips` when given, otherwise from the configured sources
//! (`TARGET_IPS` and `INPUT_FILE`); resolving zero IPs is the only
//! fatal-for-the-whole-run condition. On completion the structured run summary
//! is printed to stdout as pretty JSON.

use anyhow::{bail, Result};
use clap::Parser;
use greywire::{resolve_targets, BatchRunner, Config, DocumentStore, Fetcher};
use std::path::Path;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "greywire",
    version,
    about = "GreyNoise IP reputation ETL connector"
)]
pub struct Cli {
    /// Override the configured IP sources with an explicit list.
    #[arg(long, num_args = 1.., value_name = "IP")]
    pub ips: Vec<String>,

    /// Print normalized documents instead of inserting them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Runs one batch against the configured API and store.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;

    let ips = if cli.ips.is_empty() {
        resolve_targets(
            &config.target_ips,
            config.input_file.as_deref().map(Path::new),
        )?
    } else {
        cli.ips
    };
    if ips.is_empty() {
        bail!("no IPs provided: set TARGET_IPS, INPUT_FILE, or pass --ips");
    }

    let store = DocumentStore::connect(&config.db_url, &config.table_name()).await?;
    store.ensure_schema().await?;
    let fetcher = Fetcher::new(&config)?;

    info!("starting batch of {} IPs (dry_run: {})", ips.len(), cli.dry_run);
    let summary = BatchRunner::new(fetcher, store).run(&ips, cli.dry_run).await;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
