//! # GreyNoise Fetcher
//!
//! This module performs the "extract" stage: one logical "get record for IP"
//! operation against the remote API, with an exponential retry/backoff schedule
//! for rate limiting and transient transport failures. The backoff policy is a
//! plain value and sleeping goes through the [`Sleeper`] trait, so tests can
//! observe the schedule without real time passing.

use crate::config::Config;
use crate::constants::API_PATH_PREFIX;
use crate::types::SourceInfo;
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Doubling stops here; any realistic retry budget is spent long before.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Custom error types for the fetch stage. Every variant carries the queried IP.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("rate limit retries exhausted for {ip} after {attempts} attempts")]
    RateLimitExhausted { ip: String, attempts: u32 },
    #[error("unexpected HTTP status {status} for {ip}")]
    Http { ip: String, status: StatusCode },
    #[error("network error fetching {ip}: {source}")]
    Network {
        ip: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode response body for {ip}: {source}")]
    Decode {
        ip: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The outcome of one successful fetch.
///
/// A 404 from the API is a valid, expected outcome, not a failure, so "not
/// found" is a variant here rather than an error. Only `Found` records are
/// handed to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Found(Value),
    NotFound,
}

/// The retry schedule: `max_attempts` total tries (inclusive of the first),
/// with `initial_backoff × 2^(attempt-1)` of delay before each retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// The delay before the retry that follows the given 1-based attempt.
    /// Saturates at `Duration::MAX` instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        self.initial_backoff
            .checked_mul(2u32.pow(exponent))
            .unwrap_or(Duration::MAX)
    }
}

/// An injectable sleep, so tests can record backoff delays instead of waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// The production [`Sleeper`]: a real `tokio::time::sleep`.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// HTTP client for the GreyNoise per-IP lookup endpoint.
///
/// Holds one long-lived `reqwest::Client` built with the configured timeout,
/// reused for every IP in a batch.
pub struct Fetcher {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Fetcher {
    /// Creates a fetcher with the production sleeper.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Self::with_sleeper(config, Arc::new(TokioSleeper))
    }

    /// Creates a fetcher with an injected [`Sleeper`].
    pub fn with_sleeper(
        config: &Config,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("greywire/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            // Strip here too, not just at config load, so a directly-built
            // Config with a trailing slash still yields well-formed URLs.
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            policy: config.retry_policy(),
            sleeper,
        })
    }

    /// The full lookup URL for one IP: `{base_url}/v3/ip/{ip}`.
    pub fn endpoint_for(&self, ip: &str) -> String {
        format!("{}{}{}", self.base_url, API_PATH_PREFIX, ip)
    }

    /// The provenance block recorded on documents produced from this fetcher.
    pub fn source_info(&self, ip: &str) -> SourceInfo {
        SourceInfo {
            endpoint: self.endpoint_for(ip),
            base_url: self.base_url.clone(),
        }
    }

    /// Fetches the raw GreyNoise record for one IP.
    ///
    /// Status policy: 404 is a valid `NotFound` outcome; 429 sleeps and retries
    /// until the attempt budget is spent; any other non-2xx fails immediately;
    /// transport failures are retried on the same schedule and the last one is
    /// returned as-is. A malformed 2xx body is a fatal decode error, not
    /// retried. No sleep is issued after the final attempt.
    pub async fn fetch(&self, ip: &str) -> Result<RawRecord, FetchError> {
        let url = self.endpoint_for(ip);
        let mut attempt = 1u32;
        loop {
            let mut request = self.client.get(&url).header(ACCEPT, "application/json");
            if let Some(key) = &self.api_key {
                request = request.header("key", key);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        warn!("{ip} not found in GreyNoise");
                        return Ok(RawRecord::NotFound);
                    }
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        if attempt >= self.policy.max_attempts {
                            return Err(FetchError::RateLimitExhausted {
                                ip: ip.to_string(),
                                attempts: attempt,
                            });
                        }
                        let delay = self.policy.delay_for(attempt);
                        warn!("rate limited fetching {ip}, backing off for {delay:?} (attempt {attempt})");
                        self.sleeper.sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    if !status.is_success() {
                        return Err(FetchError::Http {
                            ip: ip.to_string(),
                            status,
                        });
                    }
                    return match response.json::<Value>().await {
                        Ok(body) => Ok(RawRecord::Found(body)),
                        Err(source) => Err(FetchError::Decode {
                            ip: ip.to_string(),
                            source,
                        }),
                    };
                }
                Err(source) => {
                    error!("error fetching {ip} (attempt {attempt}): {source}");
                    if attempt >= self.policy.max_attempts {
                        return Err(FetchError::Network {
                            ip: ip.to_string(),
                            source,
                        });
                    }
                    self.sleeper.sleep(self.policy.delay_for(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
        };
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(4), Duration::from_secs(8));
    }

    #[test]
    fn test_delay_exponent_saturates() {
        let policy = RetryPolicy {
            max_attempts: 100,
            initial_backoff: Duration::from_secs(1),
        };
        assert_eq!(policy.delay_for(17), policy.delay_for(64));
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff: Duration::MAX,
        };
        assert_eq!(policy.delay_for(2), Duration::MAX);
    }

    #[test]
    fn test_endpoint_url_tolerates_trailing_slash() {
        let config = Config {
            base_url: "https://api.example.test/".to_string(),
            ..Default::default()
        };
        let fetcher = Fetcher::new(&config).unwrap();
        assert_eq!(
            fetcher.endpoint_for("8.8.8.8"),
            "https://api.example.test/v3/ip/8.8.8.8"
        );
    }
}
