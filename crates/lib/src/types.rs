//! # Core Data Models
//!
//! This module defines the canonical document shape persisted by the connector
//! and the per-run summary reported back to the caller. A document is created
//! once per successful extract+transform and is immutable thereafter; retention
//! and compaction are external concerns.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Returns the current UTC instant as an ISO-8601 string with an explicit
/// `+00:00` offset, e.g. `2025-01-02T03:04:05.678901+00:00`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// A flattened view of the scanner-intelligence block of a raw GreyNoise record.
///
/// Every field is optional: a missing field in the raw payload stays absent here
/// rather than collapsing to a zero value. The whole struct is only present on a
/// document when the raw record carried the scanner-intelligence key at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerSummary {
    pub seen: Option<bool>,
    pub classification: Option<String>,
    pub first_seen: Option<String>,
    pub last_seen: Option<String>,
    pub actor: Option<String>,
    pub bot: Option<bool>,
    pub vpn: Option<bool>,
    pub tags: Option<Vec<Value>>,
}

/// Provenance of a document: the exact endpoint it was fetched from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub endpoint: String,
    pub base_url: String,
}

/// The canonical unit persisted by the connector, one per successfully
/// retrieved IP.
///
/// `fetched_at` and `ingested_at` are semantically distinct (time the data was
/// retrieved vs. time it was committed) and stay separate fields, even though
/// this connector stamps both from the same instant. The tuple
/// `(ip, fetched_at)` is unique in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpDocument {
    pub connector: String,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanner_summary: Option<ScannerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_service: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_metadata: Option<Value>,
    pub raw: Value,
    pub fetched_at: String,
    pub ingested_at: String,
    pub source: SourceInfo,
}

/// The terminal state of one input IP after a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Inserted,
    Duplicate,
    NotFound,
    DryRun,
    Error,
}

/// One per-IP entry of a [`RunSummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpOutcome {
    pub ip: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IpOutcome {
    pub fn new(ip: &str, status: OutcomeStatus) -> Self {
        Self {
            ip: ip.to_string(),
            status,
            error: None,
        }
    }

    /// Builds an `Error` outcome carrying the stringified cause.
    pub fn error(ip: &str, cause: impl ToString) -> Self {
        Self {
            ip: ip.to_string(),
            status: OutcomeStatus::Error,
            error: Some(cause.to_string()),
        }
    }
}

/// The ordered per-IP outcomes of one batch run, in input order.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunSummary {
    pub outcomes: Vec<IpOutcome>,
}

impl RunSummary {
    pub fn push(&mut self, outcome: IpOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Counts the outcomes that ended in the given status.
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_iso_carries_explicit_utc_offset() {
        let stamp = now_iso();
        assert!(stamp.ends_with("+00:00"), "unexpected stamp: {stamp}");
    }

    #[test]
    fn test_outcome_status_serializes_with_variant_names() {
        let outcome = IpOutcome::new("8.8.8.8", OutcomeStatus::Inserted);
        let rendered = serde_json::to_value(&outcome).unwrap();
        assert_eq!(rendered["status"], "Inserted");
        // A clean outcome omits the error key entirely.
        assert!(rendered.get("error").is_none());
    }

    #[test]
    fn test_run_summary_serializes_as_a_plain_array() {
        let mut summary = RunSummary::default();
        summary.push(IpOutcome::new("8.8.8.8", OutcomeStatus::Inserted));
        summary.push(IpOutcome::new("9.9.9.9", OutcomeStatus::NotFound));
        let rendered = serde_json::to_value(&summary).unwrap();
        assert!(rendered.is_array());
        assert_eq!(rendered.as_array().unwrap().len(), 2);
        assert_eq!(summary.count(OutcomeStatus::NotFound), 1);
    }
}
