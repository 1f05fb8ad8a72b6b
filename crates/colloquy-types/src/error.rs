use thiserror::Error;

/// Errors from repository operations (used by trait definitions in colloquy-core).
///
/// Absence of a row is never an error: reads return `Option`, deletes return
/// a bool, and soft updates return successfully without mutating anything.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("conflict: {0}")]
    Conflict(String),
}
