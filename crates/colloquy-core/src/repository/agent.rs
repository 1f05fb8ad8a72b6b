//! AgentRepository trait definition.
//!
//! CRUD operations for agents within a session. Follows the same RPITIT
//! pattern as `SessionRepository`.

use colloquy_types::error::RepositoryError;
use colloquy_types::session::SessionAgent;

/// Repository trait for agent persistence.
///
/// Agents are keyed by `(session_id, agent_id)` and owned by exactly one
/// session; deleting the session deletes its agents.
pub trait AgentRepository: Send + Sync {
    /// Insert an agent unconditionally.
    ///
    /// Unlike session creation this is not idempotent: inserting a duplicate
    /// `(session_id, agent_id)` pair surfaces `RepositoryError::Conflict`.
    fn create_agent(
        &self,
        session_id: &str,
        agent: &SessionAgent,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get an agent by its composite key, or `None` if absent.
    fn read_agent(
        &self,
        session_id: &str,
        agent_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<SessionAgent>, RepositoryError>> + Send;

    /// Replace an agent's state blobs wholesale and stamp updated_at.
    ///
    /// No partial merge: `state`, `conversation_manager_state`, and
    /// `internal_state` are all overwritten with the caller's values. If the
    /// agent does not exist this logs a warning and writes nothing.
    fn update_agent(
        &self,
        session_id: &str,
        agent: &SessionAgent,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete an agent and, via cascade, its messages.
    ///
    /// Caveat: the lookup is keyed by `agent_id` alone, without a session
    /// scope. Agent ids that repeat across sessions will all match. This
    /// mirrors the upstream contract; callers that reuse agent ids across
    /// sessions should not rely on this operation.
    fn delete_agent(
        &self,
        agent_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// List all agents in a session, ordered by creation time ascending.
    fn list_agents(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<SessionAgent>, RepositoryError>> + Send;
}
