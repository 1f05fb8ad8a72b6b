//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools. The trait impls live in the `session`,
//! `agent`, and `message` modules; shared row-mapping helpers live here.

pub mod agent;
pub mod message;
pub mod pool;
pub mod session;

use chrono::{DateTime, Utc};
use colloquy_types::error::RepositoryError;

use self::pool::DatabasePool;

/// SQLite-backed session store.
///
/// One struct implements `SessionRepository`, `AgentRepository`, and
/// `MessageRepository` from `colloquy-core` (and therefore `SessionStore`),
/// translating between the caller's domain types and the row shapes in the
/// `sessions`, `agents`, and `messages` tables.
///
/// Every operation is a single SQL statement: reads go to the reader pool,
/// writes to the single-connection writer pool, and each statement commits
/// (or is discarded) on its own. Cascading deletes and key uniqueness are
/// enforced by the engine, not by application-level locking.
pub struct SqliteSessionStore {
    pool: DatabasePool,
}

impl SqliteSessionStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Parse a JSON TEXT column back into an opaque blob.
pub(crate) fn parse_json(column: &str, s: &str) -> Result<serde_json::Value, RepositoryError> {
    serde_json::from_str(s)
        .map_err(|e| RepositoryError::Query(format!("invalid JSON in {column}: {e}")))
}

/// Serialize an opaque blob for a JSON TEXT column.
pub(crate) fn to_json(column: &str, v: &serde_json::Value) -> Result<String, RepositoryError> {
    serde_json::to_string(v)
        .map_err(|e| RepositoryError::Query(format!("serialize {column}: {e}")))
}

pub(crate) fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

/// True when the driver reported a UNIQUE/PRIMARY KEY violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE"))
}
