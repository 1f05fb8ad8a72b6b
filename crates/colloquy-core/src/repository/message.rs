//! MessageRepository trait definition.
//!
//! CRUD plus paginated listing for conversation messages. Follows the same
//! RPITIT pattern as `SessionRepository`.

use colloquy_types::error::RepositoryError;
use colloquy_types::session::SessionMessage;

/// Repository trait for message persistence.
///
/// Messages are keyed by `(session_id, agent_id, message_id)` where
/// `message_id` is a caller-assigned sequence number. Retrieval order is by
/// that number ascending, never by timestamp.
pub trait MessageRepository: Send + Sync {
    /// Insert a message unconditionally.
    ///
    /// A duplicate sequence number within `(session_id, agent_id)` surfaces
    /// `RepositoryError::Conflict`.
    fn create_message(
        &self,
        session_id: &str,
        agent_id: &str,
        message: &SessionMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a message by its full composite key, or `None` if absent.
    fn read_message(
        &self,
        session_id: &str,
        agent_id: &str,
        message_id: u32,
    ) -> impl std::future::Future<Output = Result<Option<SessionMessage>, RepositoryError>> + Send;

    /// Replace a message's content and redaction blobs and stamp updated_at.
    ///
    /// If the message does not exist this logs a warning and writes nothing.
    fn update_message(
        &self,
        session_id: &str,
        agent_id: &str,
        message: &SessionMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a message.
    ///
    /// Caveat: keyed by `message_id` alone, without session or agent scope.
    /// Sequence numbers typically repeat across agents, so every matching
    /// row is removed. This mirrors the upstream contract; prefer session or
    /// agent deletion for targeted cleanup.
    fn delete_message(
        &self,
        message_id: u32,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// List messages for an agent ordered by sequence number ascending.
    ///
    /// `offset` skips that many rows before `limit` applies; omitting `limit`
    /// returns all remaining rows from `offset` onward.
    fn list_messages(
        &self,
        session_id: &str,
        agent_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<SessionMessage>, RepositoryError>> + Send;
}
