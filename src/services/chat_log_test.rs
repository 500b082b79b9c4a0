use super::*;
use crate::state::test_helpers::{FailingStore, wait_for_entries, wait_for_failures};

#[tokio::test]
async fn recorded_entries_reach_store_in_order() {
    let store = Arc::new(MemoryConversationStore::new());
    let logger = ChatLogger::spawn(store.clone(), 8);

    logger.record(ConversationLogEntry::new("P1", "first?", "one"));
    logger.record(ConversationLogEntry::new("P1", "second?", "two"));

    let entries = wait_for_entries(&store, 2).await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].user_message, "first?");
    assert_eq!(entries[1].ai_message, "two");
    assert_eq!(logger.failures(), 0);
}

#[tokio::test]
async fn memory_store_evicts_oldest_past_limit() {
    let store = MemoryConversationStore::with_max_entries(2);
    for n in 1..=3 {
        store.append(&ConversationLogEntry::new("P1", format!("q{n}"), format!("a{n}"))).await.unwrap();
    }

    let entries = store.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].user_message, "q2");
    assert_eq!(entries[1].user_message, "q3");
}

#[tokio::test]
async fn store_failure_is_counted_not_raised() {
    let logger = ChatLogger::spawn(Arc::new(FailingStore), 8);
    logger.record(ConversationLogEntry::new("P1", "q", "a"));
    assert_eq!(wait_for_failures(&logger, 1).await, 1);
}

#[tokio::test]
async fn closed_queue_drops_and_counts() {
    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    let logger = ChatLogger { tx, failures: Arc::new(AtomicU64::new(0)) };

    logger.record(ConversationLogEntry::new("P1", "q", "a"));
    assert_eq!(logger.failures(), 1);
}

#[tokio::test]
async fn full_queue_drops_and_counts() {
    let (tx, _rx) = mpsc::channel(1);
    let logger = ChatLogger { tx, failures: Arc::new(AtomicU64::new(0)) };

    logger.record(ConversationLogEntry::new("P1", "q1", "a1"));
    logger.record(ConversationLogEntry::new("P1", "q2", "a2"));
    assert_eq!(logger.failures(), 1);
}

#[test]
fn entry_serializes_camel_case_with_rfc3339_timestamp() {
    let entry = ConversationLogEntry::new("P1", "status?", "fine");
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["projectId"], "P1");
    assert_eq!(json["userMessage"], "status?");
    assert_eq!(json["aiMessage"], "fine");
    let ts = json["timestamp"].as_str().unwrap();
    assert!(OffsetDateTime::parse(ts, &time::format_description::well_known::Rfc3339).is_ok());
}

#[test]
fn store_error_code() {
    let err = StoreError::Unavailable("x".into());
    assert!(err.retryable());
    assert_eq!(err.error_code(), "E_STORE_UNAVAILABLE");
}
