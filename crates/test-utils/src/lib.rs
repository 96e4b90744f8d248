use anyhow::Result;
use async_trait::async_trait;
use greywire::ingest::fetch::Sleeper;
use greywire::storage::DocumentStore;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The table name used by the shared test fixtures.
pub const TEST_TABLE: &str = "greynoise_riot_raw";

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub store: DocumentStore,
}

impl TestSetup {
    /// Creates a new, isolated in-memory document store and ensures the schema.
    pub async fn new() -> Result<Self> {
        let store = DocumentStore::connect(":memory:", TEST_TABLE).await?;
        store.ensure_schema().await?;
        Ok(Self { store })
    }

    /// Counts the rows currently in the document table.
    pub async fn count_documents(&self) -> Result<i64> {
        let conn = self.store.db.connect()?;
        let count: i64 = conn
            .query(&format!("SELECT COUNT(*) FROM {TEST_TABLE}"), ())
            .await?
            .next()
            .await?
            .unwrap()
            .get(0)?;
        Ok(count)
    }
}

// --- Recording Sleeper ---

/// A [`Sleeper`] that records every requested delay instead of waiting,
/// so tests can assert the backoff schedule without real time passing.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves the recorded delays for assertion.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

// --- Canned API Bodies ---

/// A representative GreyNoise v3 response body for a benign business-service IP.
pub fn riot_record(ip: &str) -> Value {
    json!({
        "ip": ip,
        "business_service_intelligence": {
            "found": true,
            "name": "Google Public DNS",
            "category": "public_dns",
            "trust_level": "1"
        },
        "internet_scanner_intelligence": {
            "seen": false,
            "classification": "benign",
            "first_seen": "2024-01-02",
            "last_seen": "2024-03-04",
            "actor": "unknown",
            "bot": false,
            "vpn": false,
            "tags": []
        },
        "request_metadata": {
            "restricted_fields": []
        }
    })
}
