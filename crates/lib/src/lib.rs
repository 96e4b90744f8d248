//! # greywire: GreyNoise IP Reputation ETL
//!
//! This crate provides the core pipeline for retrieving per-IP threat-intelligence
//! records from the GreyNoise v3 API, normalizing them into a canonical document
//! shape, and persisting them idempotently into a local Turso database. The
//! pipeline tolerates transient network failures via an exponential retry/backoff
//! policy and enforces a uniqueness contract on `(ip, fetched_at)` so reprocessing
//! the same input never creates duplicate logical records.

pub mod config;
pub mod constants;
pub mod ingest;
pub mod storage;
pub mod types;

pub use config::{Config, ConfigError};
pub use ingest::{
    normalize, resolve_targets, BatchRunner, FetchError, Fetcher, RawRecord, RetryPolicy, Sleeper,
    TokioSleeper,
};
pub use storage::{DocumentStore, InsertOutcome, StoreError};
pub use types::{IpDocument, IpOutcome, OutcomeStatus, RunSummary, ScannerSummary, SourceInfo};
