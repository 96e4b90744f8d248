//! # Application Configuration
//!
//! This module defines the configuration for the connector and the logic for
//! loading it from environment variables. Every field has a sensible default so
//! the connector can run against the public GreyNoise API with nothing but an
//! API key configured. `.env` loading happens at the binary edge (via
//! `dotenvy`); this module only reads the process environment.

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CONNECTOR_NAME, DEFAULT_DB_FILE, DEFAULT_TABLE_SUFFIX,
};
use crate::ingest::fetch::RetryPolicy;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A custom error type for configuration issues.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// The runtime configuration of the connector.
#[derive(Debug, Clone)]
pub struct Config {
    /// GreyNoise API key. `None` means requests are sent unauthenticated.
    pub api_key: Option<String>,
    /// Base URL of the GreyNoise API, with trailing slashes stripped.
    pub base_url: String,
    /// Inline comma-separated list of target IPs.
    pub target_ips: String,
    /// Optional path to a file of target IPs, one per line.
    pub input_file: Option<String>,
    /// Path to the local SQLite database file, or `:memory:`.
    pub db_url: String,
    /// Logical connector name, used to derive the storage table name.
    pub connector_name: String,
    /// Suffix appended to the connector name to form the table name.
    pub table_suffix: String,
    /// Per-request timeout for the HTTP client.
    pub request_timeout: Duration,
    /// Total fetch attempts per IP, inclusive of the first try.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on each subsequent retry.
    pub initial_backoff: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            target_ips: String::new(),
            input_file: None,
            db_url: DEFAULT_DB_FILE.to_string(),
            connector_name: DEFAULT_CONNECTOR_NAME.to_string(),
            table_suffix: DEFAULT_TABLE_SUFFIX.to_string(),
            request_timeout: Duration::from_secs(10),
            max_retries: 5,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Loads the configuration from environment variables, falling back to the
    /// defaults above for anything unset. Unparsable numeric values are fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("GN_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let base_url = env::var("GN_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let target_ips = env::var("TARGET_IPS").unwrap_or_default();
        let input_file = env::var("INPUT_FILE").ok().filter(|p| !p.is_empty());
        let db_url = env::var("DB_URL").unwrap_or_else(|_| DEFAULT_DB_FILE.to_string());
        let connector_name =
            env::var("CONNECTOR_NAME").unwrap_or_else(|_| DEFAULT_CONNECTOR_NAME.to_string());
        let table_suffix =
            env::var("TABLE_SUFFIX").unwrap_or_else(|_| DEFAULT_TABLE_SUFFIX.to_string());

        let request_timeout = parse_seconds("REQ_TIMEOUT", 10.0)?;
        let max_retries: u32 = parse_var("MAX_RETRIES", 5)?;
        let initial_backoff = parse_seconds("INITIAL_BACKOFF", 1.0)?;

        Ok(Self {
            api_key,
            base_url,
            target_ips,
            input_file,
            db_url,
            connector_name,
            table_suffix,
            request_timeout,
            max_retries,
            initial_backoff,
        })
    }

    /// The name of the storage table: `{connector_name}{table_suffix}`.
    pub fn table_name(&self) -> String {
        format!("{}{}", self.connector_name, self.table_suffix)
    }

    /// The retry policy view of this configuration. A retry budget of zero is
    /// clamped to one attempt so a fetch always runs at least once.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries.max(1),
            initial_backoff: self.initial_backoff,
        }
    }
}

/// Parses an environment variable, returning `default` when it is unset.
fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => {
            let parsed = value.trim().parse();
            parsed.map_err(|_| ConfigError::Invalid { var, value })
        }
        Err(_) => Ok(default),
    }
}

/// Parses a float-seconds environment variable into a `Duration`. Negative,
/// non-finite, and Duration-overflowing values are rejected, not panicked on.
fn parse_seconds(var: &'static str, default: f64) -> Result<Duration, ConfigError> {
    let seconds: f64 = parse_var(var, default)?;
    Duration::try_from_secs_f64(seconds).map_err(|_| ConfigError::Invalid {
        var,
        value: seconds.to_string(),
    })
}
