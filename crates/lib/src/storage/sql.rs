//! # Document Table SQL
//!
//! This module centralizes the SQL strings for the document store. The table
//! name is configurable (`{connector_name}{suffix}`), so every statement is
//! built through a function rather than kept as a constant.

/// Returns the statement creating the document table if it does not exist.
///
/// The uniqueness-relevant fields are real columns so they can be indexed; the
/// full normalized document rides along as JSON in the `document` column.
pub fn create_documents_table(table: &str) -> String {
    format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            connector TEXT NOT NULL,
            ip TEXT NOT NULL,
            fetched_at TEXT NOT NULL,
            ingested_at TEXT NOT NULL,
            document TEXT NOT NULL
        );
    "
    )
}

/// Returns the unique compound index on `(ip, fetched_at)`, the store's
/// deduplication contract.
pub fn create_ip_fetched_at_index(table: &str) -> String {
    format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_ip_fetched_at ON {table} (ip, fetched_at);"
    )
}

/// Returns the non-unique index on `ingested_at`.
pub fn create_ingested_at_index(table: &str) -> String {
    format!("CREATE INDEX IF NOT EXISTS idx_{table}_ingested_at ON {table} (ingested_at);")
}

/// Returns the non-unique index on `connector`.
pub fn create_connector_index(table: &str) -> String {
    format!("CREATE INDEX IF NOT EXISTS idx_{table}_connector ON {table} (connector);")
}

/// All statements required to bring the schema up, in execution order.
pub fn schema_statements(table: &str) -> Vec<String> {
    vec![
        create_documents_table(table),
        create_ip_fetched_at_index(table),
        create_ingested_at_index(table),
        create_connector_index(table),
    ]
}

/// Returns the single-document insert statement.
pub fn insert_document(table: &str) -> String {
    format!(
        "INSERT INTO {table} (id, connector, ip, fetched_at, ingested_at, document) VALUES (?, ?, ?, ?, ?, ?)"
    )
}
