//! SQLite message repository implementation.
//!
//! Implements `MessageRepository` from `colloquy-core`. Messages are keyed
//! by a caller-assigned sequence number and listed in that order; the
//! composite primary key makes duplicate sequence numbers a conflict.

use colloquy_core::repository::message::MessageRepository;
use colloquy_types::error::RepositoryError;
use colloquy_types::session::SessionMessage;

use super::{
    SqliteSessionStore, format_datetime, is_unique_violation, parse_datetime, parse_json,
    query_err, to_json,
};

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct MessageRow {
    message_id: i64,
    message: String,
    redact_message: Option<String>,
    created_at: String,
    updated_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            message_id: row.try_get("message_id")?,
            message: row.try_get("message")?,
            redact_message: row.try_get("redact_message")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_message(self) -> Result<SessionMessage, RepositoryError> {
        let redact_message = self
            .redact_message
            .as_deref()
            .map(|s| parse_json("redact_message", s))
            .transpose()?;

        Ok(SessionMessage {
            message_id: self.message_id as u32,
            message: parse_json("message", &self.message)?,
            redact_message,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// MessageRepository impl
// ---------------------------------------------------------------------------

impl MessageRepository for SqliteSessionStore {
    async fn create_message(
        &self,
        session_id: &str,
        agent_id: &str,
        message: &SessionMessage,
    ) -> Result<(), RepositoryError> {
        let content = to_json("message", &message.message)?;
        let redacted = message
            .redact_message
            .as_ref()
            .map(|v| to_json("redact_message", v))
            .transpose()?;

        let result = sqlx::query(
            r#"INSERT INTO messages
               (session_id, agent_id, message_id, message, redact_message, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session_id)
        .bind(agent_id)
        .bind(message.message_id as i64)
        .bind(&content)
        .bind(&redacted)
        .bind(format_datetime(&message.created_at))
        .bind(format_datetime(&message.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                tracing::error!(
                    session_id = %session_id,
                    agent_id = %agent_id,
                    message_id = message.message_id,
                    "duplicate message sequence number"
                );
                Err(RepositoryError::Conflict(format!(
                    "message {} already exists for agent '{}' in session '{}'",
                    message.message_id, agent_id, session_id
                )))
            }
            Err(e) => {
                tracing::error!(
                    session_id = %session_id,
                    agent_id = %agent_id,
                    message_id = message.message_id,
                    error = %e,
                    "failed to create message"
                );
                Err(query_err(e))
            }
        }
    }

    async fn read_message(
        &self,
        session_id: &str,
        agent_id: &str,
        message_id: u32,
    ) -> Result<Option<SessionMessage>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM messages WHERE session_id = ? AND agent_id = ? AND message_id = ?",
        )
        .bind(session_id)
        .bind(agent_id)
        .bind(message_id as i64)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %session_id, agent_id = %agent_id, message_id, error = %e, "failed to read message");
            query_err(e)
        })?;

        match row {
            Some(row) => {
                let message_row = MessageRow::from_row(&row).map_err(query_err)?;
                Ok(Some(message_row.into_message()?))
            }
            None => Ok(None),
        }
    }

    async fn update_message(
        &self,
        session_id: &str,
        agent_id: &str,
        message: &SessionMessage,
    ) -> Result<(), RepositoryError> {
        let content = to_json("message", &message.message)?;
        let redacted = message
            .redact_message
            .as_ref()
            .map(|v| to_json("redact_message", v))
            .transpose()?;

        let result = sqlx::query(
            r#"UPDATE messages
               SET message = ?, redact_message = ?, updated_at = ?
               WHERE session_id = ? AND agent_id = ? AND message_id = ?"#,
        )
        .bind(&content)
        .bind(&redacted)
        .bind(format_datetime(&message.updated_at))
        .bind(session_id)
        .bind(agent_id)
        .bind(message.message_id as i64)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            tracing::error!(
                session_id = %session_id,
                agent_id = %agent_id,
                message_id = message.message_id,
                error = %e,
                "failed to update message"
            );
            query_err(e)
        })?;

        if result.rows_affected() == 0 {
            tracing::warn!(
                session_id = %session_id,
                agent_id = %agent_id,
                message_id = message.message_id,
                "message not found for update"
            );
        }

        Ok(())
    }

    async fn delete_message(&self, message_id: u32) -> Result<bool, RepositoryError> {
        // Keyed by message_id alone; see the trait-level caveat about scope.
        let result = sqlx::query("DELETE FROM messages WHERE message_id = ?")
            .bind(message_id as i64)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| {
                tracing::error!(message_id, error = %e, "failed to delete message");
                query_err(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_messages(
        &self,
        session_id: &str,
        agent_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<SessionMessage>, RepositoryError> {
        let mut sql = String::from(
            "SELECT * FROM messages WHERE session_id = ? AND agent_id = ? ORDER BY message_id ASC",
        );

        // SQLite needs a LIMIT clause to accept OFFSET; -1 means unbounded.
        match (limit, offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        let rows = sqlx::query(&sql)
            .bind(session_id)
            .bind(agent_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session_id, agent_id = %agent_id, error = %e, "failed to list messages");
                query_err(e)
            })?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message_row = MessageRow::from_row(row).map_err(query_err)?;
            messages.push(message_row.into_message()?);
        }

        Ok(messages)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
