//! Core data models used throughout Vault Recall.
//!
//! These types represent the documents, sync records, and query results that
//! flow through the synchronization and retrieval pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note read from the vault. Read-only to the engine: the vault owns the
/// full document lifecycle.
#[derive(Debug, Clone)]
pub struct NoteDocument {
    /// Vault-relative path, the stable document identifier.
    pub id: String,
    pub body: String,
    pub modified_at: DateTime<Utc>,
}

/// Durable per-document sync state, keyed by document id in the
/// [`SyncStateStore`](crate::state::SyncStateStore).
///
/// Invariant: `uploaded == true` means the currently active index holds
/// content matching `fingerprint` as of `uploaded_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSyncRecord {
    pub fingerprint: String,
    pub modified_at: DateTime<Utc>,
    pub uploaded: bool,
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Opaque identifier for one remote retrieval index.
///
/// At most one handle is active per engine. Deleting the index invalidates
/// every sync record, so handle deletion and state clearing are paired (see
/// [`SyncEngine::delete_index`](crate::engine::SyncEngine::delete_index)).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexHandle(pub String);

impl IndexHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome counters for one bulk sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Documents uploaded and confirmed by the backend.
    pub success: u64,
    /// Documents that failed upload (left unsynced; retried next run).
    pub failed: u64,
    /// Documents whose fingerprint was unchanged.
    pub skipped: u64,
}

/// Aggregate counts over the sync state store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub total: u64,
    pub synced: u64,
    pub pending: u64,
}

/// Lifecycle of one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Completed,
    Error,
}

/// Ephemeral, in-memory progress of one sync run.
///
/// `processed` is monotonic: it only increases, and equals `total` exactly
/// once, at completion.
#[derive(Debug, Clone)]
pub struct SyncProgress {
    pub total: u64,
    pub processed: u64,
    /// Document currently being uploaded, cleared at completion.
    pub current_item: Option<String>,
    pub status: SyncStatus,
}

impl SyncProgress {
    pub fn starting(total: u64) -> Self {
        Self {
            total,
            processed: 0,
            current_item: None,
            status: SyncStatus::Syncing,
        }
    }
}

/// Which backend call a query is routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Plain conversational completion; the vault index is not consulted.
    Plain,
    /// Indexed retrieval over the active index, with citations.
    Grounded,
}

/// Answer returned per query. Not persisted.
#[derive(Debug, Clone)]
pub struct QueryAnswer {
    pub text: String,
    /// Formatted source list, present only for grounded queries.
    pub citations: Option<String>,
}
