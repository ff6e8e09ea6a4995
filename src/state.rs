//! Durable per-document sync state.
//!
//! A plain in-memory map from document id to [`DocumentSyncRecord`]. The
//! store does no I/O itself: the engine loads it from the settings store at
//! startup and snapshots it back after every sync run. Single-threaded
//! access is assumed; the bulk uploader is the only writer.

use std::collections::{HashMap, HashSet};

use crate::models::{DocumentSyncRecord, SyncStats};

#[derive(Debug, Default)]
pub struct SyncStateStore {
    records: HashMap<String, DocumentSyncRecord>,
}

impl SyncStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the in-memory state wholesale. Called once at startup from
    /// externally persisted settings.
    pub fn load(&mut self, records: HashMap<String, DocumentSyncRecord>) {
        self.records = records;
    }

    /// Current state for external persistence. Called after every sync run.
    pub fn snapshot(&self) -> HashMap<String, DocumentSyncRecord> {
        self.records.clone()
    }

    pub fn get(&self, id: &str) -> Option<&DocumentSyncRecord> {
        self.records.get(id)
    }

    pub fn put(&mut self, id: String, record: DocumentSyncRecord) {
        self.records.insert(id, record);
    }

    /// Drop every record. Required whenever the active index is deleted:
    /// records are only meaningful against the index they were uploaded to.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Drop records whose document id is not in `live_ids`.
    ///
    /// Only called after a successful full-vault sync, since only a full
    /// enumeration proves a record's document is gone. Returns the number
    /// of orphans removed.
    pub fn retain_ids(&mut self, live_ids: &HashSet<String>) -> usize {
        let before = self.records.len();
        self.records.retain(|id, _| live_ids.contains(id));
        before - self.records.len()
    }

    pub fn stats(&self) -> SyncStats {
        let total = self.records.len() as u64;
        let synced = self.records.values().filter(|r| r.uploaded).count() as u64;
        SyncStats {
            total,
            synced,
            pending: total - synced,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
