//! SessionRepository trait definition.
//!
//! CRUD operations for top-level sessions. Uses native async fn in traits
//! (RPITIT, Rust 2024 edition).

use colloquy_types::error::RepositoryError;
use colloquy_types::session::Session;

/// Repository trait for session persistence.
///
/// Implementations live in colloquy-store (e.g., `SqliteSessionStore`).
pub trait SessionRepository: Send + Sync {
    /// Create a session if it does not already exist.
    ///
    /// Idempotent: when a row with the same id is already present, nothing is
    /// written (the stored timestamps are untouched) and the caller's input
    /// is returned unchanged. Two concurrent creators for the same id cannot
    /// both insert; the loser's write is discarded, not surfaced as an error.
    fn create_session(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<Session, RepositoryError>> + Send;

    /// Get a session by its unique id, or `None` if absent.
    fn read_session(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Session>, RepositoryError>> + Send;

    /// Touch a session's metadata (session_type, updated_at).
    ///
    /// If the session does not exist this logs a warning and returns the
    /// input unchanged -- a missing row here is not an error.
    fn update_session(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<Session, RepositoryError>> + Send;

    /// Delete a session and, via cascade, all of its agents and messages.
    ///
    /// Returns whether a row was actually removed.
    fn delete_session(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
