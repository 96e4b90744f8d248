//! # greywire: GreyNoise IP Reputation ETL
//!
//! This is the main entry point for the `greywire` command-line interface.
//! The binary is a thin entrypoint; all logic is delegated to the
//! `greywire-cli` library crate.

use anyhow::Result;
use clap::Parser;
use greywire_cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load the .env file, if any, before anything reads the environment.
    dotenvy::dotenv().ok();

    // 2. Setup logging
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive("greywire=info".parse()?))
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 3. Parse CLI arguments
    let cli = Cli::parse();

    // 4. Call the library's run function and handle the final result
    if let Err(e) = run(cli).await {
        eprintln!("[greywire error] {e:?}");
        std::process::exit(1);
    }

    Ok(())
}
