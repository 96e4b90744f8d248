//! # Raw Record Normalization
//!
//! The "transform" stage: a pure mapping from a raw GreyNoise response body to
//! the canonical [`IpDocument`]. There are no failure modes here; a field
//! missing from the raw payload maps to an absent field on the document, never
//! to an error or a zero value.

use crate::constants::CONNECTOR_ID;
use crate::types::{now_iso, IpDocument, ScannerSummary, SourceInfo};
use serde_json::Value;

/// Maps a raw record into the canonical document shape.
///
/// Only called for records that were actually retrieved; not-found responses
/// never reach this stage. `fetched_at` and `ingested_at` are both stamped
/// from one instant captured here. The queried `ip` is the fallback when the
/// body lacks an `ip` field of its own.
pub fn normalize(ip: &str, raw: &Value, source: SourceInfo) -> IpDocument {
    let stamped = now_iso();

    // The scanner block is only materialized when the raw record carries the
    // key at all; a present-but-null block yields an all-empty summary.
    let scanner_summary = raw
        .get("internet_scanner_intelligence")
        .map(|block| ScannerSummary {
            seen: block.get("seen").and_then(Value::as_bool),
            classification: string_field(block, "classification"),
            first_seen: string_field(block, "first_seen"),
            last_seen: string_field(block, "last_seen"),
            actor: string_field(block, "actor"),
            bot: block.get("bot").and_then(Value::as_bool),
            vpn: block.get("vpn").and_then(Value::as_bool),
            tags: block.get("tags").and_then(Value::as_array).cloned(),
        });

    IpDocument {
        connector: CONNECTOR_ID.to_string(),
        ip: raw
            .get("ip")
            .and_then(Value::as_str)
            .unwrap_or(ip)
            .to_string(),
        scanner_summary,
        business_service: raw.get("business_service_intelligence").cloned(),
        request_metadata: raw.get("request_metadata").cloned(),
        raw: raw.clone(),
        fetched_at: stamped.clone(),
        ingested_at: stamped,
        source,
    }
}

fn string_field(block: &Value, key: &str) -> Option<String> {
    block.get(key).and_then(Value::as_str).map(str::to_string)
}
