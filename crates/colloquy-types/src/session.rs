//! Session, agent, and message types for the Colloquy store.
//!
//! These types model the three-level persistence hierarchy: a session owns
//! agents, and each agent owns an ordered message history. State payloads
//! are opaque `serde_json::Value` blobs -- the store never looks inside them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::fmt;
use std::str::FromStr;

/// Kind of session.
///
/// Serializes to/from the string tags stored in the `session_type` column
/// (`"AGENT"` / `"MULTI_AGENT"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    Agent,
    MultiAgent,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Agent => write!(f, "AGENT"),
            SessionType::MultiAgent => write!(f, "MULTI_AGENT"),
        }
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AGENT" => Ok(SessionType::Agent),
            "MULTI_AGENT" => Ok(SessionType::MultiAgent),
            other => Err(format!("invalid session type: '{other}'")),
        }
    }
}

/// A top-level conversation context grouping one or more agents.
///
/// The `session_id` is caller-assigned and immutable once created.
/// Deleting a session cascades to all of its agents and messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub session_type: SessionType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a session with both timestamps set to now.
    pub fn new(session_id: impl Into<String>, session_type: SessionType) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            session_type,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A stateful participant within a session.
///
/// Keyed by `(session_id, agent_id)`; the session id travels separately as a
/// call parameter. The state blobs are caller-owned and replaced wholesale on
/// update -- there is no partial merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAgent {
    pub agent_id: String,
    pub state: Value,
    pub conversation_manager_state: Value,
    /// Internal framework state. Callers see this under the `_internal_state`
    /// key; the store keeps it in the `_internal_state` column.
    #[serde(rename = "_internal_state", default)]
    pub internal_state: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionAgent {
    /// Create an agent with no internal state and timestamps set to now.
    pub fn new(
        agent_id: impl Into<String>,
        state: Value,
        conversation_manager_state: Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            agent_id: agent_id.into(),
            state,
            conversation_manager_state,
            internal_state: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One ordered turn of content attributed to an agent within a session.
///
/// The `message_id` is a caller-assigned sequence number, unique within
/// `(session_id, agent_id)`. Retrieval order is by this number ascending,
/// never by timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    pub message_id: u32,
    pub message: Value,
    /// Redacted replacement content, if the original was redacted after the fact.
    #[serde(default)]
    pub redact_message: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionMessage {
    /// Create a message with no redaction and timestamps set to now.
    pub fn new(message_id: u32, message: Value) -> Self {
        let now = Utc::now();
        Self {
            message_id,
            message,
            redact_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}
