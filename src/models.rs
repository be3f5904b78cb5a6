//! Core data types shared by the resolver, the stores and the sync engine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Kind tag written on every capture record.
pub const CAPTURE_KIND: &str = "pdf";

/// Status code written on every capture record; the file exists, so the
/// retrieval succeeded.
pub const CAPTURE_HTTP_STATUS: i64 = 200;

/// A catalog document that a capture file can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub document_id: String,
    pub url: String,
    pub title: Option<String>,
    pub category: Option<String>,
}

impl Document {
    /// Title when present and non-empty, otherwise the URL.
    pub fn label(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => &self.url,
        }
    }
}

/// A file found in a capture folder.
#[derive(Debug, Clone)]
pub struct CaptureFile {
    pub path: PathBuf,
    pub file_name: String,
    pub stem: String,
}

/// One row of the `captures` table.
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    pub capture_id: String,
    pub document_id: String,
    pub captured_by: String,
    pub capture_ts: DateTime<Utc>,
    pub kind: String,
    pub http_status: Option<i64>,
    pub file_path: String,
    pub content_hash: String,
    pub notes: Option<String>,
}

/// Which branch an upsert took, with the id of the record it landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted { capture_id: String },
    Updated { capture_id: String },
}

impl UpsertOutcome {
    pub fn capture_id(&self) -> &str {
        match self {
            UpsertOutcome::Inserted { capture_id } | UpsertOutcome::Updated { capture_id } => {
                capture_id
            }
        }
    }
}

/// What happened to a single file during a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Inserted { capture_id: String },
    Updated { capture_id: String },
    WouldInsert,
    Skipped,
    InvalidChoice { input: String },
    HashFailed { error: String },
    StoreFailed { error: String },
}

impl From<UpsertOutcome> for FileOutcome {
    fn from(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Inserted { capture_id } => FileOutcome::Inserted { capture_id },
            UpsertOutcome::Updated { capture_id } => FileOutcome::Updated { capture_id },
        }
    }
}

/// Totals for one sync run. In a dry run `inserted` counts files that
/// would be inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub files: u64,
    pub inserted: u64,
    pub updated: u64,
    pub skipped: u64,
    pub invalid: u64,
    pub failed: u64,
    pub dry_run: bool,
}

impl SyncSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Inserted { .. } | FileOutcome::WouldInsert => self.inserted += 1,
            FileOutcome::Updated { .. } => self.updated += 1,
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::InvalidChoice { .. } => self.invalid += 1,
            FileOutcome::HashFailed { .. } | FileOutcome::StoreFailed { .. } => self.failed += 1,
        }
    }
}
