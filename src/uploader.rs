//! Bulk upload of the vault delta to the remote index.
//!
//! The defining design goal is cheap re-runs: only documents whose content
//! fingerprint changed are uploaded, failures leave no sync record (so the
//! next run naturally retries them), and a run tolerates per-item failure
//! across thousands of items without losing already-synced state.
//!
//! Uploads are strictly sequential. The backend enforces request-rate
//! limits, and concurrent uploads would need separate rate-limiting logic.
//! Each upload is an async submit followed by a bounded poll loop at a
//! fixed interval; exceeding the poll ceiling fails that item only.
//!
//! Ordering contract (tests rely on this): the progress reporter fires
//! *before* each item starts, with `current_item` set; `processed` is
//! incremented *after* every item regardless of outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::backend::{OperationHandle, RetrievalBackend};
use crate::delta::select_for_sync;
use crate::error::EngineError;
use crate::fingerprint::fingerprint;
use crate::models::{
    DocumentSyncRecord, IndexHandle, NoteDocument, SyncProgress, SyncStatus, SyncSummary,
};
use crate::progress::SyncProgressReporter;
use crate::state::SyncStateStore;

/// Caller-triggered cancellation. Checked before each item starts, never
/// mid-upload; records for already-completed items remain valid.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Poll pacing for one upload operation.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
}

impl UploadPolicy {
    pub fn from_config(config: &crate::config::BackendConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_poll_attempts: config.max_poll_attempts,
        }
    }
}

/// Per-item upload state machine.
enum UploadPhase {
    Submitted(OperationHandle),
    Polling { op: OperationHandle, attempts: u32 },
    Done,
    TimedOut { attempts: u32 },
    Failed(EngineError),
}

/// Upload changed documents to the index, updating the state store per
/// successful item.
///
/// With `full`, recorded fingerprints are ignored and every document is
/// re-uploaded. An empty delta is not an error: the run completes
/// immediately with `skipped == total`.
pub async fn sync_vault(
    backend: &dyn RetrievalBackend,
    policy: UploadPolicy,
    documents: &[NoteDocument],
    state: &mut SyncStateStore,
    handle: &IndexHandle,
    reporter: &dyn SyncProgressReporter,
    cancel: &CancelFlag,
    full: bool,
) -> SyncSummary {
    let delta = if full {
        documents.to_vec()
    } else {
        select_for_sync(documents, state)
    };

    let mut summary = SyncSummary {
        skipped: (documents.len() - delta.len()) as u64,
        ..Default::default()
    };

    let mut progress = SyncProgress::starting(delta.len() as u64);

    if delta.is_empty() {
        progress.status = SyncStatus::Completed;
        reporter.report(&progress);
        return summary;
    }

    let mut cancelled = false;

    for doc in &delta {
        if cancel.is_cancelled() {
            tracing::info!("sync cancelled before '{}'", doc.id);
            cancelled = true;
            break;
        }

        progress.current_item = Some(doc.id.clone());
        reporter.report(&progress);

        match upload_one(backend, policy, handle, doc).await {
            Ok(()) => {
                state.put(
                    doc.id.clone(),
                    DocumentSyncRecord {
                        fingerprint: fingerprint(&doc.body),
                        modified_at: doc.modified_at,
                        uploaded: true,
                        uploaded_at: Some(Utc::now()),
                    },
                );
                summary.success += 1;
            }
            Err(e) => {
                // No record written: the item stays eligible for the next
                // delta computation, which is the retry mechanism.
                tracing::warn!("upload of '{}' failed: {}", doc.id, e);
                summary.failed += 1;
            }
        }

        progress.processed += 1;
    }

    progress.current_item = None;
    progress.status = if cancelled {
        SyncStatus::Error
    } else {
        SyncStatus::Completed
    };
    reporter.report(&progress);

    summary
}

/// Drive one document through submit → poll → done.
async fn upload_one(
    backend: &dyn RetrievalBackend,
    policy: UploadPolicy,
    handle: &IndexHandle,
    doc: &NoteDocument,
) -> Result<(), EngineError> {
    let mut phase = match backend.upload_document(handle, &doc.id, &doc.body).await {
        Ok(op) => UploadPhase::Submitted(op),
        Err(e) => UploadPhase::Failed(e),
    };

    loop {
        phase = match phase {
            UploadPhase::Submitted(op) => UploadPhase::Polling { op, attempts: 0 },

            UploadPhase::Polling { op, attempts } => {
                if attempts >= policy.max_poll_attempts {
                    UploadPhase::TimedOut { attempts }
                } else {
                    if attempts > 0 {
                        tokio::time::sleep(policy.poll_interval).await;
                    }
                    match backend.poll_operation(&op).await {
                        Ok(status) if status.done => match status.error {
                            None => UploadPhase::Done,
                            Some(reason) => UploadPhase::Failed(EngineError::UploadRejected {
                                id: doc.id.clone(),
                                reason,
                            }),
                        },
                        Ok(_) => UploadPhase::Polling {
                            op,
                            attempts: attempts + 1,
                        },
                        Err(e) => UploadPhase::Failed(e),
                    }
                }
            }

            UploadPhase::Done => return Ok(()),

            UploadPhase::TimedOut { attempts } => {
                return Err(EngineError::UploadTimeout {
                    id: doc.id.clone(),
                    attempts,
                })
            }

            UploadPhase::Failed(e) => return Err(e),
        };
    }
}
