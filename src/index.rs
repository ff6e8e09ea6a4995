//! Remote index lifecycle.
//!
//! Owns the single active [`IndexHandle`] and drives it through
//! absent → creating → active → deleting → absent. Creation is idempotent:
//! an already-active handle is returned as-is, so repeated "sync now"
//! invocations never create duplicate remote indexes.
//!
//! Contract for callers: deleting the store invalidates every sync record,
//! so [`delete_store`](IndexStoreManager::delete_store) must be paired with
//! clearing the sync state store. The manager does not own that store; the
//! engine does the pairing.

use std::sync::Arc;

use crate::backend::RetrievalBackend;
use crate::error::Result;
use crate::models::IndexHandle;

pub struct IndexStoreManager {
    backend: Arc<dyn RetrievalBackend>,
    active: Option<IndexHandle>,
}

impl IndexStoreManager {
    /// Create a manager, restoring a previously persisted handle if any.
    pub fn new(backend: Arc<dyn RetrievalBackend>, active: Option<IndexHandle>) -> Self {
        Self { backend, active }
    }

    /// The currently active handle, if one exists.
    pub fn active(&self) -> Option<&IndexHandle> {
        self.active.as_ref()
    }

    /// Return the active handle, creating the remote index first if absent.
    ///
    /// Creation failures propagate with the remote message attached; there
    /// is no automatic retry since this is a rare, user-initiated action.
    pub async fn initialize_store(&mut self, display_name: &str) -> Result<IndexHandle> {
        if let Some(handle) = &self.active {
            return Ok(handle.clone());
        }

        tracing::info!("creating remote index '{}'", display_name);
        let handle = self.backend.create_index(display_name).await?;
        self.active = Some(handle.clone());
        Ok(handle)
    }

    /// Delete the active index, forcing removal even if non-empty, and
    /// forget the handle. No-op when no handle is active.
    pub async fn delete_store(&mut self) -> Result<()> {
        let Some(handle) = self.active.take() else {
            return Ok(());
        };

        tracing::info!("deleting remote index {}", handle);
        match self.backend.delete_index(&handle, true).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // Deletion failed; the index still exists remotely.
                self.active = Some(handle);
                Err(e)
            }
        }
    }

    /// Enumerate remote indexes. Read-only; never changes the active handle.
    pub async fn list_stores(&self) -> Result<Vec<IndexHandle>> {
        self.backend.list_indexes().await
    }
}
