//! The sync engine: explicit owner of all mutable plugin state.
//!
//! One [`SyncEngine`] per host instance owns the sync state store, the
//! active index handle, and the single-flight sync guard, and exposes the
//! surface the shell calls: [`sync_vault`](SyncEngine::sync_vault),
//! [`query`](SyncEngine::query), [`delete_index`](SyncEngine::delete_index),
//! and [`get_sync_stats`](SyncEngine::get_sync_stats). Nothing here is a
//! global; init and teardown follow the host lifecycle.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::backend::RetrievalBackend;
use crate::citations;
use crate::config::Config;
use crate::delta::select_for_sync;
use crate::error::{EngineError, Result};
use crate::index::IndexStoreManager;
use crate::models::{IndexHandle, NoteDocument, QueryAnswer, QueryMode, SyncStats, SyncSummary};
use crate::progress::SyncProgressReporter;
use crate::settings::{PersistedState, SettingsStore};
use crate::state::SyncStateStore;
use crate::uploader::{self, CancelFlag, UploadPolicy};
use crate::vault;

struct EngineState {
    state: SyncStateStore,
    index: IndexStoreManager,
}

pub struct SyncEngine {
    config: Config,
    backend: Arc<dyn RetrievalBackend>,
    settings: SettingsStore,
    inner: Mutex<EngineState>,
    /// Single-flight guard: only one sync may run at a time. Interleaved
    /// syncs would race on the state store and duplicate uploads.
    sync_active: AtomicBool,
}

/// Resets the single-flight flag when a sync run ends, on any path.
struct SyncGuard<'a>(&'a AtomicBool);

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SyncEngine {
    /// Construct the engine, restoring persisted state from the settings
    /// store.
    pub fn new(config: Config, backend: Arc<dyn RetrievalBackend>) -> Result<Self> {
        let settings = SettingsStore::new(config.state.path.clone());
        let persisted = settings.load()?;

        let mut state = SyncStateStore::new();
        state.load(persisted.sync_records);

        let index = IndexStoreManager::new(Arc::clone(&backend), persisted.active_index);

        Ok(Self {
            config,
            backend,
            settings,
            inner: Mutex::new(EngineState { state, index }),
            sync_active: AtomicBool::new(false),
        })
    }

    /// Synchronize the vault (optionally a path-prefix scope) into the
    /// remote index, creating the index on first use.
    ///
    /// Only one sync may run at a time; a second invocation fails with
    /// [`EngineError::SyncInProgress`]. After a successful full-scope run,
    /// sync records for documents no longer in the vault are pruned — a
    /// scoped enumeration cannot prove a document is gone, so scoped runs
    /// never prune.
    pub async fn sync_vault(
        &self,
        scope: Option<&str>,
        reporter: &dyn SyncProgressReporter,
        cancel: &CancelFlag,
        full: bool,
    ) -> Result<SyncSummary> {
        if self
            .sync_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::SyncInProgress);
        }
        let _guard = SyncGuard(&self.sync_active);

        let documents = self.scan(scope)?;
        let full_scope = scope.map_or(true, |s| s.trim_matches('/').is_empty());

        let mut inner = self.inner.lock().await;

        let handle = inner
            .index
            .initialize_store(&self.config.index.display_name)
            .await?;

        let policy = UploadPolicy::from_config(&self.config.backend);
        let summary = uploader::sync_vault(
            self.backend.as_ref(),
            policy,
            &documents,
            &mut inner.state,
            &handle,
            reporter,
            cancel,
            full,
        )
        .await;

        if full_scope && !cancel.is_cancelled() {
            let live: HashSet<String> = documents.iter().map(|d| d.id.clone()).collect();
            let pruned = inner.state.retain_ids(&live);
            if pruned > 0 {
                tracing::info!("pruned {} sync records for deleted notes", pruned);
            }
        }

        self.persist(&inner)?;

        tracing::info!(
            "sync done: {} uploaded, {} failed, {} unchanged",
            summary.success,
            summary.failed,
            summary.skipped
        );

        Ok(summary)
    }

    /// Compute the delta without uploading anything (dry run).
    pub async fn preview_delta(&self, scope: Option<&str>) -> Result<Vec<NoteDocument>> {
        let documents = self.scan(scope)?;
        let inner = self.inner.lock().await;
        Ok(select_for_sync(&documents, &inner.state))
    }

    /// Route a query through the plain conversational call or the indexed
    /// retrieval call.
    ///
    /// Grounded mode requires an active index. Without one this fails with
    /// [`EngineError::NotSynced`] — never a silent fall-through to plain
    /// mode, which would mislead the user into thinking the vault was
    /// searched.
    pub async fn query(&self, text: &str, mode: QueryMode) -> Result<QueryAnswer> {
        match mode {
            QueryMode::Plain => {
                let answer = self.backend.complete(text).await?;
                Ok(QueryAnswer {
                    text: answer,
                    citations: None,
                })
            }
            QueryMode::Grounded => {
                let handle = {
                    let inner = self.inner.lock().await;
                    inner.index.active().cloned().ok_or(EngineError::NotSynced)?
                };

                let response = self.backend.query_with_retrieval(text, &handle).await?;
                let sources = citations::extract(response.grounding.as_ref());

                Ok(QueryAnswer {
                    text: response.text,
                    citations: Some(sources),
                })
            }
        }
    }

    /// Delete the remote index and clear all sync state.
    ///
    /// The pairing is the point: records only describe the index they were
    /// uploaded to, so they are cleared atomically with handle deletion.
    pub async fn delete_index(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.index.delete_store().await?;
        inner.state.clear();
        self.persist(&inner)
    }

    /// Enumerate remote indexes (read-only).
    pub async fn list_indexes(&self) -> Result<Vec<IndexHandle>> {
        let inner = self.inner.lock().await;
        inner.index.list_stores().await
    }

    /// Aggregate counts over the sync state store.
    pub async fn get_sync_stats(&self) -> SyncStats {
        let inner = self.inner.lock().await;
        inner.state.stats()
    }

    /// The currently active index handle, if any.
    pub async fn active_index(&self) -> Option<IndexHandle> {
        let inner = self.inner.lock().await;
        inner.index.active().cloned()
    }

    fn scan(&self, scope: Option<&str>) -> Result<Vec<NoteDocument>> {
        vault::list_documents(&self.config.vault, scope)
            .map_err(|e| EngineError::Vault(e.to_string()))
    }

    fn persist(&self, inner: &EngineState) -> Result<()> {
        self.settings.save(&PersistedState {
            active_index: inner.index.active().cloned(),
            sync_records: inner.state.snapshot(),
        })
    }
}
