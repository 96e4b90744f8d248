//! # Ingestion Pipeline
//!
//! This module provides the extract/transform stages of the connector: fetching
//! raw records from the GreyNoise API with retry/backoff, normalizing them into
//! the canonical document shape, resolving the input IP list, and driving the
//! whole pipeline per batch.

pub mod fetch;
pub mod normalize;
pub mod runner;
pub mod targets;

pub use fetch::{FetchError, Fetcher, RawRecord, RetryPolicy, Sleeper, TokioSleeper};
pub use normalize::normalize;
pub use runner::BatchRunner;
pub use targets::resolve_targets;
