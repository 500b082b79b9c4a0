//! Conversation log: append-only record of every answered chat.
//!
//! DESIGN
//! ======
//! Logging is decoupled from answer delivery. The chat handler calls
//! `ChatLogger::record`, a non-blocking `try_send` onto a bounded queue. A
//! background worker drains the queue in order and appends each entry to the
//! configured `ConversationStore`.
//!
//! ERROR HANDLING
//! ==============
//! A failed append or a dropped entry never reaches the HTTP response. It is
//! logged and counted; the counter is exposed on `/healthz`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::{RwLock, mpsc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

/// One question/answer exchange. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationLogEntry {
    pub id: Uuid,
    pub project_id: String,
    pub user_message: String,
    pub ai_message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ConversationLogEntry {
    #[must_use]
    pub fn new(project_id: impl Into<String>, user_message: impl Into<String>, ai_message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id: project_id.into(),
            user_message: user_message.into(),
            ai_message: ai_message.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("conversation store unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "E_STORE_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// STORES
// =============================================================================

/// Persistent, append-only home for log entries.
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the write is rejected.
    async fn append(&self, entry: &ConversationLogEntry) -> Result<(), StoreError>;
}

/// `chat_logs` table in Postgres.
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationStore for PgConversationStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn append(&self, entry: &ConversationLogEntry) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO chat_logs (id, project_id, user_message, ai_message, created_at)
              VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.id)
        .bind(&entry.project_id)
        .bind(&entry.user_message)
        .bind(&entry.ai_message)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

pub const DEFAULT_MEMORY_LOG_MAX_ENTRIES: usize = 10_000;

/// Process-local store used when no database is configured. Holds at most
/// `max_entries`; the oldest entry is evicted first.
pub struct MemoryConversationStore {
    entries: RwLock<VecDeque<ConversationLogEntry>>,
    max_entries: usize,
}

impl Default for MemoryConversationStore {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MEMORY_LOG_MAX_ENTRIES)
    }
}

impl MemoryConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self { entries: RwLock::new(VecDeque::new()), max_entries }
    }

    /// Snapshot of retained entries in append order.
    pub async fn entries(&self) -> Vec<ConversationLogEntry> {
        self.entries.read().await.iter().cloned().collect()
    }
}

#[async_trait::async_trait]
impl ConversationStore for MemoryConversationStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, entry: &ConversationLogEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        Ok(())
    }
}

// =============================================================================
// LOGGER
// =============================================================================

/// Handle used by request handlers. Cheap to clone.
#[derive(Clone)]
pub struct ChatLogger {
    tx: mpsc::Sender<ConversationLogEntry>,
    failures: Arc<AtomicU64>,
}

impl ChatLogger {
    /// Spawn the append worker and return its handle.
    #[must_use]
    pub fn spawn(store: Arc<dyn ConversationStore>, queue_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let failures = Arc::new(AtomicU64::new(0));
        info!(store = store.name(), queue_capacity, "chat log worker configured");
        tokio::spawn(run_worker(store, rx, failures.clone()));
        Self { tx, failures }
    }

    /// Best-effort, non-blocking enqueue.
    pub fn record(&self, entry: ConversationLogEntry) {
        match self.tx.try_send(entry) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(entry)) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(id = %entry.id, project_id = %entry.project_id, "chat log queue full; dropping entry");
            }
            Err(mpsc::error::TrySendError::Closed(entry)) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(id = %entry.id, project_id = %entry.project_id, "chat log queue closed; dropping entry");
            }
        }
    }

    /// Entries that were dropped or failed to append since startup.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

async fn run_worker(
    store: Arc<dyn ConversationStore>,
    mut rx: mpsc::Receiver<ConversationLogEntry>,
    failures: Arc<AtomicU64>,
) {
    while let Some(entry) = rx.recv().await {
        if let Err(e) = store.append(&entry).await {
            failures.fetch_add(1, Ordering::Relaxed);
            error!(
                error = %e,
                code = e.error_code(),
                id = %entry.id,
                project_id = %entry.project_id,
                "chat log append failed"
            );
        }
    }
}

#[cfg(test)]
#[path = "chat_log_test.rs"]
mod tests;
