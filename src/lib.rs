//! # Vault Recall
//!
//! A vault synchronization and retrieval-grounded query engine for note
//! collections.
//!
//! Vault Recall keeps a remote retrieval index in step with a local note
//! vault — uploading only documents whose content fingerprint changed,
//! tracking per-document sync state durably, and tolerating partial
//! failure across large batches — and routes questions either through a
//! plain conversational call or an indexed-retrieval call whose grounding
//! metadata is distilled into human-readable citations.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐   ┌──────────────┐   ┌───────────────┐
//! │  Vault  │──▶│ Delta + Bulk │──▶│ Remote index   │
//! │ (notes) │   │   Uploader   │   │ (file search)  │
//! └─────────┘   └──────┬───────┘   └───────┬───────┘
//!                      │                   │
//!            ┌─────────▼────────┐   ┌──────▼───────┐
//!            │ Sync state store │   │ Query router │
//!            │  (JSON settings) │   │ + citations  │
//!            └──────────────────┘   └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`fingerprint`] | Content fingerprinting |
//! | [`state`] | Per-document sync state |
//! | [`delta`] | Changed-document selection |
//! | [`vault`] | Read-only note store on disk |
//! | [`settings`] | Persisted engine state |
//! | [`backend`] | Remote backend trait + HTTP implementation |
//! | [`index`] | Remote index lifecycle |
//! | [`uploader`] | Sequential bulk upload with polling |
//! | [`citations`] | Grounding-metadata citation extraction |
//! | [`progress`] | Sync progress reporting |
//! | [`engine`] | The engine owning all of the above |
//! | [`error`] | Engine error taxonomy |

pub mod backend;
pub mod citations;
pub mod config;
pub mod delta;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod models;
pub mod progress;
pub mod settings;
pub mod state;
pub mod uploader;
pub mod vault;
