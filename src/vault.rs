//! Read-only document store over the note vault on disk.
//!
//! Walks the configured vault root, applies include/exclude globs and an
//! optional path-prefix scope, and returns [`NoteDocument`]s with their
//! modification timestamps. The engine never creates, edits, or deletes
//! vault files.

use anyhow::{bail, Result};
use chrono::{TimeZone, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::VaultConfig;
use crate::models::NoteDocument;

/// List all documents in the vault, optionally restricted to a path-prefix
/// scope (empty or `/` means the entire vault).
///
/// Output is sorted by document id for deterministic ordering.
pub fn list_documents(config: &VaultConfig, scope: Option<&str>) -> Result<Vec<NoteDocument>> {
    let root = &config.root;
    if !root.exists() {
        bail!("Vault root does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/.obsidian/**".to_string(),
        "**/.trash/**".to_string(),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let scope_prefix = scope
        .map(|s| s.trim_start_matches('/'))
        .filter(|s| !s.is_empty());

    let mut documents = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if let Some(prefix) = scope_prefix {
            if !rel_str.starts_with(prefix) {
                continue;
            }
        }

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        documents.push(read_document(path, &rel_str)?);
    }

    documents.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(documents)
}

/// Read a single document's text by its vault-relative id.
pub fn read(config: &VaultConfig, id: &str) -> Result<String> {
    let path = config.root.join(id);
    std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read note '{}': {}", id, e))
}

fn read_document(path: &Path, id: &str) -> Result<NoteDocument> {
    let metadata = std::fs::metadata(path)?;
    let modified = metadata
        .modified()
        .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
    let modified_secs = modified
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;

    // Non-UTF8 files are skipped as empty rather than failing the scan.
    let body = std::fs::read_to_string(path).unwrap_or_default();

    Ok(NoteDocument {
        id: id.to_string(),
        body,
        modified_at: Utc.timestamp_opt(modified_secs, 0).unwrap(),
    })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
