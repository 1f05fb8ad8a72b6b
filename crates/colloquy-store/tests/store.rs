//! End-to-end tests for the SQLite session store.
//!
//! Exercises the full session -> agent -> message lifecycle through the
//! `SessionStore` capability set, the way a calling agent framework would.

use colloquy_core::repository::{
    AgentRepository, MessageRepository, SessionRepository, SessionStore,
};
use colloquy_store::{DatabasePool, SqliteSessionStore};
use colloquy_types::session::{Session, SessionAgent, SessionMessage, SessionType};
use serde_json::json;

async fn test_store() -> SqliteSessionStore {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    std::mem::forget(dir);
    SqliteSessionStore::new(DatabasePool::new(&url).await.unwrap())
}

/// Generic over the capability set: anything implementing `SessionStore`
/// must be able to run a conversation lifecycle unchanged.
async fn run_conversation<S: SessionStore>(store: &S) {
    store
        .create_session(&Session::new("s1", SessionType::Agent))
        .await
        .unwrap();

    store
        .create_agent("s1", &SessionAgent::new("a1", json!({"counter": 0}), json!({})))
        .await
        .unwrap();

    for id in 1..=5u32 {
        let msg = SessionMessage::new(
            id,
            json!({"role": "user", "content": [{"text": format!("turn {id}")}]}),
        );
        store.create_message("s1", "a1", &msg).await.unwrap();
    }
}

#[tokio::test]
async fn test_full_conversation_lifecycle() {
    let store = test_store().await;
    run_conversation(&store).await;

    let messages = store.list_messages("s1", "a1", None, None).await.unwrap();
    assert_eq!(messages.len(), 5);
    let ids: Vec<u32> = messages.iter().map(|m| m.message_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    let mut agent = store.read_agent("s1", "a1").await.unwrap().unwrap();
    agent.state = json!({"counter": 5});
    store.update_agent("s1", &agent).await.unwrap();

    let updated = store.read_agent("s1", "a1").await.unwrap().unwrap();
    assert_eq!(updated.state, json!({"counter": 5}));

    // Deleting the session takes the agent and all five messages with it
    assert!(store.delete_session("s1").await.unwrap());
    assert!(store.read_session("s1").await.unwrap().is_none());
    assert!(store.read_agent("s1", "a1").await.unwrap().is_none());
    assert!(store.list_messages("s1", "a1", None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cascade_leaves_sibling_sessions_untouched() {
    let store = test_store().await;

    for (session_id, n) in [("s1", 1), ("s2", 2)] {
        store
            .create_session(&Session::new(session_id, SessionType::Agent))
            .await
            .unwrap();
        store
            .create_agent(session_id, &SessionAgent::new("a", json!({"n": n}), json!({})))
            .await
            .unwrap();
        store
            .create_message(
                session_id,
                "a",
                &SessionMessage::new(0, json!({"role": "user", "content": []})),
            )
            .await
            .unwrap();
    }

    assert!(store.delete_session("s1").await.unwrap());

    let survivor = store.read_agent("s2", "a").await.unwrap().unwrap();
    assert_eq!(survivor.state, json!({"n": 2}));
    assert_eq!(store.list_messages("s2", "a", None, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_not_found_contract_never_errors() {
    let store = test_store().await;

    assert!(store.read_session("none").await.unwrap().is_none());
    assert!(store.read_agent("none", "none").await.unwrap().is_none());
    assert!(store.read_message("none", "none", 0).await.unwrap().is_none());

    assert!(!store.delete_session("none").await.unwrap());
    assert!(!store.delete_agent("none").await.unwrap());
    assert!(!store.delete_message(0).await.unwrap());

    store
        .update_session(&Session::new("none", SessionType::Agent))
        .await
        .unwrap();
    store
        .update_agent("none", &SessionAgent::new("none", json!({}), json!({})))
        .await
        .unwrap();
    store
        .update_message("none", "none", &SessionMessage::new(0, json!({})))
        .await
        .unwrap();

    assert!(store.list_agents("none").await.unwrap().is_empty());
    assert!(store.list_messages("none", "none", None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_large_history_pagination() {
    let store = test_store().await;

    store
        .create_session(&Session::new("s1", SessionType::Agent))
        .await
        .unwrap();
    store
        .create_agent("s1", &SessionAgent::new("a1", json!({}), json!({})))
        .await
        .unwrap();

    let total = 1200u32;
    for id in 0..total {
        store
            .create_message(
                "s1",
                "a1",
                &SessionMessage::new(id, json!({"role": "user", "content": [{"text": "t"}]})),
            )
            .await
            .unwrap();
    }

    // Pages of 500 partition the history exactly once, in order
    let mut seen = Vec::new();
    let mut offset = 0i64;
    loop {
        let page = store
            .list_messages("s1", "a1", Some(500), Some(offset))
            .await
            .unwrap();
        if page.is_empty() {
            break;
        }
        seen.extend(page.iter().map(|m| m.message_id));
        offset += 500;
    }
    assert_eq!(seen, (0..total).collect::<Vec<u32>>());

    let window = store
        .list_messages("s1", "a1", Some(10), Some(1100))
        .await
        .unwrap();
    assert_eq!(window.first().unwrap().message_id, 1100);
    assert_eq!(window.last().unwrap().message_id, 1109);
}

#[tokio::test]
async fn test_agent_state_roundtrip_fidelity() {
    let store = test_store().await;

    store
        .create_session(&Session::new("s1", SessionType::MultiAgent))
        .await
        .unwrap();

    let state = json!({
        "strings": "text",
        "numbers": [1, 2.5, -3],
        "bools": {"yes": true, "no": false},
        "nothing": null,
        "deep": {"a": {"b": {"c": [{"d": 1}]}}}
    });
    let mut agent = SessionAgent::new("a1", state.clone(), json!({"removed_count": 0}));
    agent.internal_state = Some(json!({"checkpoints": [1, 2, 3]}));

    store.create_agent("s1", &agent).await.unwrap();

    let found = store.read_agent("s1", "a1").await.unwrap().unwrap();
    assert_eq!(found.state, state);
    assert_eq!(found.conversation_manager_state, json!({"removed_count": 0}));
    assert_eq!(found.internal_state, Some(json!({"checkpoints": [1, 2, 3]})));

    let session = store.read_session("s1").await.unwrap().unwrap();
    assert_eq!(session.session_type, SessionType::MultiAgent);
}
