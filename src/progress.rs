//! Sync progress reporting.
//!
//! Reports observable progress during a bulk sync so users see which note is
//! uploading, how much is left, and when the run finishes. Progress is
//! emitted on **stderr** so stdout remains parseable for scripts.

use std::io::Write;

use crate::models::{SyncProgress, SyncStatus};

/// Reports sync progress. Implementations write to stderr (human or JSON).
///
/// The uploader calls [`report`](SyncProgressReporter::report) before each
/// item starts (with `current_item` set) and once at completion.
pub trait SyncProgressReporter: Send + Sync {
    fn report(&self, progress: &SyncProgress);
}

/// Human-friendly progress on stderr:
/// `sync  uploading  12 / 1,234  Daily Note.md`.
pub struct StderrProgress;

impl SyncProgressReporter for StderrProgress {
    fn report(&self, progress: &SyncProgress) {
        let line = match (progress.status, &progress.current_item) {
            (SyncStatus::Syncing, Some(item)) => format!(
                "sync  uploading  {} / {}  {}\n",
                format_number(progress.processed + 1),
                format_number(progress.total),
                item
            ),
            (SyncStatus::Completed, _) => format!(
                "sync  completed  {} / {} items\n",
                format_number(progress.processed),
                format_number(progress.total)
            ),
            _ => return,
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl SyncProgressReporter for JsonProgress {
    fn report(&self, progress: &SyncProgress) {
        let status = match progress.status {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Completed => "completed",
            SyncStatus::Error => "error",
        };
        let obj = serde_json::json!({
            "event": "progress",
            "status": status,
            "processed": progress.processed,
            "total": progress.total,
            "current": progress.current_item,
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl SyncProgressReporter for NoProgress {
    fn report(&self, _progress: &SyncProgress) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the shell: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode. Caller passes it to the sync run.
    pub fn reporter(&self) -> Box<dyn SyncProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
