//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `colloquy-core`. Session creation is
//! idempotent via `INSERT OR IGNORE`, which also resolves the race between
//! two concurrent creators of the same id: exactly one row lands, the other
//! write is discarded by the engine, and neither caller sees an error.

use colloquy_core::repository::session::SessionRepository;
use colloquy_types::error::RepositoryError;
use colloquy_types::session::{Session, SessionType};

use super::{SqliteSessionStore, format_datetime, parse_datetime, query_err};

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct SessionRow {
    session_id: String,
    session_type: String,
    created_at: String,
    updated_at: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            session_id: row.try_get("session_id")?,
            session_type: row.try_get("session_type")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self) -> Result<Session, RepositoryError> {
        let session_type: SessionType = self
            .session_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Session {
            session_id: self.session_id,
            session_type,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// SessionRepository impl
// ---------------------------------------------------------------------------

impl SessionRepository for SqliteSessionStore {
    async fn create_session(&self, session: &Session) -> Result<Session, RepositoryError> {
        let result = sqlx::query(
            r#"INSERT OR IGNORE INTO sessions (session_id, session_type, created_at, updated_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(&session.session_id)
        .bind(session.session_type.to_string())
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %session.session_id, error = %e, "failed to create session");
            query_err(e)
        })?;

        if result.rows_affected() == 0 {
            tracing::debug!(session_id = %session.session_id, "session already exists, skipping creation");
        }

        Ok(session.clone())
    }

    async fn read_session(&self, session_id: &str) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session_id, error = %e, "failed to read session");
                query_err(e)
            })?;

        match row {
            Some(row) => {
                let session_row = SessionRow::from_row(&row).map_err(query_err)?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update_session(&self, session: &Session) -> Result<Session, RepositoryError> {
        let result =
            sqlx::query("UPDATE sessions SET session_type = ?, updated_at = ? WHERE session_id = ?")
                .bind(session.session_type.to_string())
                .bind(format_datetime(&session.updated_at))
                .bind(&session.session_id)
                .execute(&self.pool.writer)
                .await
                .map_err(|e| {
                    tracing::error!(session_id = %session.session_id, error = %e, "failed to update session");
                    query_err(e)
                })?;

        if result.rows_affected() == 0 {
            tracing::warn!(session_id = %session.session_id, "session not found for update");
        }

        Ok(session.clone())
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session_id, error = %e, "failed to delete session");
                query_err(e)
            })?;

        if result.rows_affected() == 0 {
            tracing::warn!(session_id = %session_id, "session not found for delete");
            return Ok(false);
        }

        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;

    async fn test_store() -> SqliteSessionStore {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        SqliteSessionStore::new(DatabasePool::new(&url).await.unwrap())
    }

    #[tokio::test]
    async fn test_create_and_read_session() {
        let store = test_store().await;

        let session = Session::new("s1", SessionType::Agent);
        let created = store.create_session(&session).await.unwrap();
        assert_eq!(created.session_id, "s1");

        let found = store.read_session("s1").await.unwrap().unwrap();
        assert_eq!(found.session_id, "s1");
        assert_eq!(found.session_type, SessionType::Agent);
        assert_eq!(found.created_at, session.created_at);
    }

    #[tokio::test]
    async fn test_create_session_is_idempotent() {
        let store = test_store().await;

        let first = Session::new("s1", SessionType::Agent);
        store.create_session(&first).await.unwrap();

        // Second create with different metadata must not touch the row
        let second = Session::new("s1", SessionType::MultiAgent);
        let returned = store.create_session(&second).await.unwrap();
        assert_eq!(returned.session_type, SessionType::MultiAgent);

        let stored = store.read_session("s1").await.unwrap().unwrap();
        assert_eq!(stored.session_type, SessionType::Agent);
        assert_eq!(stored.created_at, first.created_at);
        assert_eq!(stored.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_read_nonexistent_session() {
        let store = test_store().await;
        let found = store.read_session("ghost").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_update_session_touches_metadata() {
        let store = test_store().await;

        let mut session = Session::new("s1", SessionType::Agent);
        store.create_session(&session).await.unwrap();

        session.session_type = SessionType::MultiAgent;
        session.updated_at = chrono::Utc::now();
        store.update_session(&session).await.unwrap();

        let stored = store.read_session("s1").await.unwrap().unwrap();
        assert_eq!(stored.session_type, SessionType::MultiAgent);
        assert_eq!(stored.updated_at, session.updated_at);
        assert_eq!(stored.created_at, session.created_at);
    }

    #[tokio::test]
    async fn test_update_nonexistent_session_is_soft_noop() {
        let store = test_store().await;

        let session = Session::new("ghost", SessionType::Agent);
        let returned = store.update_session(&session).await.unwrap();
        assert_eq!(returned.session_id, "ghost");

        assert!(store.read_session("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let store = test_store().await;

        store
            .create_session(&Session::new("s1", SessionType::Agent))
            .await
            .unwrap();

        assert!(store.delete_session("s1").await.unwrap());
        assert!(store.read_session("s1").await.unwrap().is_none());

        // Second delete finds nothing
        assert!(!store.delete_session("s1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_nonexistent_session_returns_false() {
        let store = test_store().await;
        assert!(!store.delete_session("ghost").await.unwrap());
    }
}
