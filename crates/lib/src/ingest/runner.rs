//! # Batch Runner
//!
//! Orchestrates the pipeline per input IP: fetch, normalize, then insert (or
//! print, in dry-run). Processing is strictly sequential in input order, and no
//! single IP's failure terminates the batch; every per-IP failure is caught
//! here and converted into a summary entry.

use crate::ingest::fetch::{Fetcher, RawRecord};
use crate::ingest::normalize::normalize;
use crate::storage::{DocumentStore, InsertOutcome};
use crate::types::{IpOutcome, OutcomeStatus, RunSummary};
use tracing::{error, info, warn};

/// Drives Fetcher → Normalizer → Sink for a batch of IPs.
pub struct BatchRunner {
    fetcher: Fetcher,
    store: DocumentStore,
}

impl BatchRunner {
    pub fn new(fetcher: Fetcher, store: DocumentStore) -> Self {
        Self { fetcher, store }
    }

    /// Runs the batch, yielding exactly one outcome per non-blank input IP.
    ///
    /// In dry-run mode the pipeline short-circuits after normalization: the
    /// document is logged instead of being handed to the store.
    pub async fn run(&self, ips: &[String], dry_run: bool) -> RunSummary {
        let mut summary = RunSummary::default();

        for ip in ips {
            let ip = ip.trim();
            if ip.is_empty() {
                continue;
            }

            let raw = match self.fetcher.fetch(ip).await {
                Ok(raw) => raw,
                Err(e) => {
                    error!("giving up on {ip}: {e}");
                    summary.push(IpOutcome::error(ip, e));
                    continue;
                }
            };

            let body = match raw {
                RawRecord::NotFound => {
                    summary.push(IpOutcome::new(ip, OutcomeStatus::NotFound));
                    continue;
                }
                RawRecord::Found(body) => body,
            };

            let doc = normalize(ip, &body, self.fetcher.source_info(ip));

            if dry_run {
                match serde_json::to_string_pretty(&doc) {
                    Ok(rendered) => info!("dry-run document for {}:\n{rendered}", doc.ip),
                    Err(e) => warn!("failed to render dry-run document for {}: {e}", doc.ip),
                }
                summary.push(IpOutcome::new(ip, OutcomeStatus::DryRun));
                continue;
            }

            match self.store.insert(&doc).await {
                Ok(InsertOutcome::Inserted) => {
                    info!("inserted document for {}", doc.ip);
                    summary.push(IpOutcome::new(ip, OutcomeStatus::Inserted));
                }
                Ok(InsertOutcome::DuplicateRejected) => {
                    info!("duplicate rejected for {}", doc.ip);
                    summary.push(IpOutcome::new(ip, OutcomeStatus::Duplicate));
                }
                Err(e) => {
                    error!("failed to store document for {}: {e}", doc.ip);
                    summary.push(IpOutcome::error(ip, e));
                }
            }
        }

        info!(
            "batch completed: {} inserted, {} duplicate, {} not found, {} dry-run, {} errors",
            summary.count(OutcomeStatus::Inserted),
            summary.count(OutcomeStatus::Duplicate),
            summary.count(OutcomeStatus::NotFound),
            summary.count(OutcomeStatus::DryRun),
            summary.count(OutcomeStatus::Error),
        );

        summary
    }
}
