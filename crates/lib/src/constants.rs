//! # Shared Constants
//!
//! This module provides a centralized location for constants that are shared across
//! the `greywire` workspace. Using these constants helps to avoid "magic strings"
//! and ensures consistency between the library, the CLI, and the tests.

/// The constant source identifier stamped into every normalized document.
pub const CONNECTOR_ID: &str = "greynoise";

/// The path prefix of the per-IP lookup endpoint on the GreyNoise API.
pub const API_PATH_PREFIX: &str = "/v3/ip/";

/// The default base URL of the GreyNoise API.
pub const DEFAULT_BASE_URL: &str = "https://api.greynoise.io";

/// The default path for the main application SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/greywire.db";

/// The default logical connector name, used to derive the storage table name.
pub const DEFAULT_CONNECTOR_NAME: &str = "greynoise_riot";

/// The default suffix appended to the connector name to form the table name.
pub const DEFAULT_TABLE_SUFFIX: &str = "_raw";
