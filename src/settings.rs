//! Persisted engine state.
//!
//! The settings store holds everything the engine must remember across
//! restarts: the active index handle and the sync-record snapshot. It is a
//! single JSON file; a missing file is an empty state, not an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::{DocumentSyncRecord, IndexHandle};

/// Serialized engine state, as written to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub active_index: Option<IndexHandle>,
    #[serde(default)]
    pub sync_records: HashMap<String, DocumentSyncRecord>,
}

/// File-backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted state, or the default if no file exists yet.
    pub fn load(&self) -> Result<PersistedState> {
        if !self.path.exists() {
            return Ok(PersistedState::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            EngineError::State(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            EngineError::State(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Write the state back. Called after every sync run and after index
    /// lifecycle changes.
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EngineError::State(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| EngineError::State(format!("failed to serialize state: {}", e)))?;

        std::fs::write(&self.path, json).map_err(|e| {
            EngineError::State(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}
