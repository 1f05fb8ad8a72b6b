//! SQLite agent repository implementation.
//!
//! Implements `AgentRepository` from `colloquy-core`. Agent state blobs are
//! opaque JSON: serialized on write, parsed on read, never reinterpreted.
//! Updates replace all three blobs wholesale.

use colloquy_core::repository::agent::AgentRepository;
use colloquy_types::error::RepositoryError;
use colloquy_types::session::SessionAgent;

use super::{
    SqliteSessionStore, format_datetime, is_unique_violation, parse_datetime, parse_json,
    query_err, to_json,
};

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct AgentRow {
    agent_id: String,
    state: String,
    conversation_manager_state: String,
    internal_state: Option<String>,
    created_at: String,
    updated_at: String,
}

impl AgentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            agent_id: row.try_get("agent_id")?,
            state: row.try_get("state")?,
            conversation_manager_state: row.try_get("conversation_manager_state")?,
            internal_state: row.try_get("_internal_state")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_agent(self) -> Result<SessionAgent, RepositoryError> {
        let internal_state = self
            .internal_state
            .as_deref()
            .map(|s| parse_json("_internal_state", s))
            .transpose()?;

        Ok(SessionAgent {
            agent_id: self.agent_id,
            state: parse_json("state", &self.state)?,
            conversation_manager_state: parse_json(
                "conversation_manager_state",
                &self.conversation_manager_state,
            )?,
            internal_state,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// AgentRepository impl
// ---------------------------------------------------------------------------

impl AgentRepository for SqliteSessionStore {
    async fn create_agent(
        &self,
        session_id: &str,
        agent: &SessionAgent,
    ) -> Result<(), RepositoryError> {
        let state = to_json("state", &agent.state)?;
        let manager_state =
            to_json("conversation_manager_state", &agent.conversation_manager_state)?;
        let internal_state = agent
            .internal_state
            .as_ref()
            .map(|v| to_json("_internal_state", v))
            .transpose()?;

        let result = sqlx::query(
            r#"INSERT INTO agents
               (session_id, agent_id, state, conversation_manager_state, _internal_state,
                created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session_id)
        .bind(&agent.agent_id)
        .bind(&state)
        .bind(&manager_state)
        .bind(&internal_state)
        .bind(format_datetime(&agent.created_at))
        .bind(format_datetime(&agent.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                tracing::error!(session_id = %session_id, agent_id = %agent.agent_id, "duplicate agent");
                Err(RepositoryError::Conflict(format!(
                    "agent '{}' already exists in session '{}'",
                    agent.agent_id, session_id
                )))
            }
            Err(e) => {
                tracing::error!(session_id = %session_id, agent_id = %agent.agent_id, error = %e, "failed to create agent");
                Err(query_err(e))
            }
        }
    }

    async fn read_agent(
        &self,
        session_id: &str,
        agent_id: &str,
    ) -> Result<Option<SessionAgent>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM agents WHERE session_id = ? AND agent_id = ?")
            .bind(session_id)
            .bind(agent_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session_id, agent_id = %agent_id, error = %e, "failed to read agent");
                query_err(e)
            })?;

        match row {
            Some(row) => {
                let agent_row = AgentRow::from_row(&row).map_err(query_err)?;
                Ok(Some(agent_row.into_agent()?))
            }
            None => Ok(None),
        }
    }

    async fn update_agent(
        &self,
        session_id: &str,
        agent: &SessionAgent,
    ) -> Result<(), RepositoryError> {
        let state = to_json("state", &agent.state)?;
        let manager_state =
            to_json("conversation_manager_state", &agent.conversation_manager_state)?;
        let internal_state = agent
            .internal_state
            .as_ref()
            .map(|v| to_json("_internal_state", v))
            .transpose()?;

        let result = sqlx::query(
            r#"UPDATE agents
               SET state = ?, conversation_manager_state = ?, _internal_state = ?, updated_at = ?
               WHERE session_id = ? AND agent_id = ?"#,
        )
        .bind(&state)
        .bind(&manager_state)
        .bind(&internal_state)
        .bind(format_datetime(&agent.updated_at))
        .bind(session_id)
        .bind(&agent.agent_id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %session_id, agent_id = %agent.agent_id, error = %e, "failed to update agent");
            query_err(e)
        })?;

        if result.rows_affected() == 0 {
            tracing::warn!(session_id = %session_id, agent_id = %agent.agent_id, "agent not found for update");
        }

        Ok(())
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<bool, RepositoryError> {
        // Keyed by agent_id alone; see the trait-level caveat about scope.
        let result = sqlx::query("DELETE FROM agents WHERE agent_id = ?")
            .bind(agent_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| {
                tracing::error!(agent_id = %agent_id, error = %e, "failed to delete agent");
                query_err(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_agents(&self, session_id: &str) -> Result<Vec<SessionAgent>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM agents WHERE session_id = ? ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %session_id, error = %e, "failed to list agents");
            query_err(e)
        })?;

        let mut agents = Vec::with_capacity(rows.len());
        for row in &rows {
            let agent_row = AgentRow::from_row(row).map_err(query_err)?;
            agents.push(agent_row.into_agent()?);
        }

        Ok(agents)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
