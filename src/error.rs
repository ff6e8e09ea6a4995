//! Engine error taxonomy.
//!
//! Every failure that crosses the engine boundary is one of these variants,
//! so the shell can map each to a user-facing message without string
//! matching. Per-item upload failures during bulk sync are counted and
//! logged inside the uploader and never surface here; store lifecycle
//! failures and query failures do.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A grounded query was attempted with no active index.
    #[error("vault is not synced: no active index (run `recall sync` first)")]
    NotSynced,

    /// A single document's upload exceeded the poll-attempt ceiling.
    #[error("upload of '{id}' timed out after {attempts} polls")]
    UploadTimeout { id: String, attempts: u32 },

    /// The backend definitively rejected one document.
    #[error("upload of '{id}' rejected: {reason}")]
    UploadRejected { id: String, reason: String },

    /// Backend throttling. Surfaced as-is; never silently retried within
    /// the same request.
    #[error("backend rate limit hit; wait a moment and retry")]
    RateLimited,

    /// Invalid or expired credential.
    #[error("authentication failed: check GEMINI_API_KEY")]
    AuthFailed,

    /// 5xx-class remote failure.
    #[error("backend unavailable (HTTP {status}): {message}")]
    BackendUnavailable { status: u16, message: String },

    /// Safety-filter rejection of a query or document.
    #[error("request blocked by the backend's content filter")]
    ContentBlocked,

    /// Grounding metadata did not match any known shape. Produced by the
    /// grounding parser, consumed by the citation fallback; never shown to
    /// the user as an error.
    #[error("grounding metadata has an unrecognized shape")]
    MalformedMetadata,

    /// A sync run is already active on this engine.
    #[error("a sync is already in progress")]
    SyncInProgress,

    /// The backend answered 2xx with a body missing the expected fields.
    #[error("unexpected backend response: {0}")]
    UnexpectedResponse(String),

    /// Transport-level failure talking to the backend.
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Persisted state could not be loaded or saved.
    #[error("state persistence failed: {0}")]
    State(String),

    /// The vault could not be enumerated or read.
    #[error("vault scan failed: {0}")]
    Vault(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
