//! # Document Store
//!
//! The "load" stage: idempotent persistence of normalized documents into a
//! local Turso database. The table carries a unique compound index on
//! `(ip, fetched_at)`; inserting a duplicate pair is caught and reported as an
//! outcome, never surfaced as a fatal error, so batch processing continues.

use crate::types::IpDocument;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use turso::{params, Database};
use uuid::Uuid;

mod sql;

/// Custom error types for the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),
    #[error("database error: {0}")]
    Database(#[from] turso::Error),
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The result of one insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicateRejected,
}

/// A handle to the connector's document table in a local Turso database.
///
/// The `Database` manages a connection pool and is cloneable; one store is
/// acquired at startup and reused for every insert in a batch.
#[derive(Clone)]
pub struct DocumentStore {
    pub db: Database,
    table: String,
}

impl DocumentStore {
    /// Opens (or creates) the database at `db_url`. Use `:memory:` for an
    /// isolated in-memory database. Parent directories of a file-backed path
    /// are created as needed.
    pub async fn connect(db_url: &str, table: &str) -> Result<Self, StoreError> {
        if db_url != ":memory:" {
            if let Some(parent) = Path::new(db_url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StoreError::Connection(e.to_string()))?;
                }
            }
        }

        let db = turso::Builder::new_local(db_url)
            .build()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        // Enable WAL mode for better concurrency on file-backed databases.
        // Use `query` for PRAGMA statements that return a value to avoid
        // "unexpected row" errors.
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            db,
            table: table.to_string(),
        })
    }

    /// The name of the backing table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Ensures the document table and its three indexes exist: unique on
    /// `(ip, fetched_at)`, non-unique on `ingested_at` and `connector`.
    /// Idempotent and safe to call on every startup.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.db.connect()?;
        for statement in sql::schema_statements(&self.table) {
            conn.execute(&statement, ()).await?;
        }
        info!("schema ensured for table {}", self.table);
        Ok(())
    }

    /// Inserts one document as a single atomic create.
    ///
    /// A violation of the `(ip, fetched_at)` unique constraint maps to
    /// [`InsertOutcome::DuplicateRejected`]; the existing row is never
    /// overwritten. Any other persistence failure is an error, fatal for this
    /// IP's insert only.
    pub async fn insert(&self, doc: &IpDocument) -> Result<InsertOutcome, StoreError> {
        let conn = self.db.connect()?;
        let rendered = serde_json::to_string(doc)?;
        let id = Uuid::new_v4().to_string();

        match conn
            .execute(
                &sql::insert_document(&self.table),
                params![
                    id,
                    doc.connector.clone(),
                    doc.ip.clone(),
                    doc.fetched_at.clone(),
                    doc.ingested_at.clone(),
                    rendered
                ],
            )
            .await
        {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(turso::Error::SqlExecutionFailure(msg))
                if msg.contains("UNIQUE constraint failed") =>
            {
                Ok(InsertOutcome::DuplicateRejected)
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }
}
