//! Delta selection: which documents need (re-)upload.
//!
//! The "smart sync" guarantee lives here: a document is selected only if it
//! has never been synced or its content fingerprint differs from the last
//! recorded one. A resync after zero edits must select zero documents.

use crate::fingerprint::fingerprint;
use crate::models::NoteDocument;
use crate::state::SyncStateStore;

/// Select the subset of `documents` requiring upload.
///
/// A document is included iff no sync record exists for its id, or the
/// recorded fingerprint differs from the current content fingerprint.
/// Output preserves input order, so progress reporting is deterministic.
pub fn select_for_sync(documents: &[NoteDocument], state: &SyncStateStore) -> Vec<NoteDocument> {
    documents
        .iter()
        .filter(|doc| match state.get(&doc.id) {
            Some(record) => record.fingerprint != fingerprint(&doc.body),
            None => true,
        })
        .cloned()
        .collect()
}
