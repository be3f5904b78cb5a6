//! Sync progress reporting.
//!
//! Reports what `capsync sync` is doing file by file: which file is being
//! processed, which document it resolved to, and what the store did with it.
//! Progress is emitted on **stderr** so stdout stays reserved for the final
//! summary.

use std::io::Write;
use std::path::PathBuf;

use crate::models::FileOutcome;

/// A single progress event for sync.
#[derive(Clone, Debug)]
pub enum SyncProgressEvent {
    /// Capture files were enumerated in `dir`.
    Discovered {
        dir: PathBuf,
        files: u64,
        dry_run: bool,
    },
    /// File `n` of `total` is being processed.
    Processing { file: String, n: u64, total: u64 },
    /// The mapped URL for `stem` no longer matches any catalog document.
    StaleMapping { stem: String, url: String },
    /// A new mapping entry was saved.
    Mapped { stem: String, url: String },
    /// The file resolved and was hashed.
    Hashed {
        file: String,
        document_id: String,
        content_hash: String,
        file_path: String,
    },
    /// Final result for one file.
    Finished { file: String, outcome: FileOutcome },
}

/// Reports sync progress. Implementations write to stderr (human or JSON).
pub trait SyncProgressReporter: Send + Sync {
    fn report(&self, event: SyncProgressEvent);
}

/// Human-friendly progress on stderr.
pub struct StderrProgress;

impl SyncProgressReporter for StderrProgress {
    fn report(&self, event: SyncProgressEvent) {
        let line = human_line(&event);
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

fn human_line(event: &SyncProgressEvent) -> String {
    match event {
        SyncProgressEvent::Discovered {
            dir,
            files,
            dry_run,
        } => {
            let mut s = format!("Found {} file(s) in {}\n", files, dir.display());
            if *dry_run {
                s.push_str("DRY RUN: no captures will be written.\n");
            }
            s
        }
        SyncProgressEvent::Processing { file, n, total } => {
            format!("\n[{}/{}] {}\n", n, total, file)
        }
        SyncProgressEvent::StaleMapping { stem, url } => format!(
            "  WARNING: '{}' mapped to {} which is no longer in the catalog; re-assigning.\n",
            stem, url
        ),
        SyncProgressEvent::Mapped { stem, url } => format!("  Mapped '{}' -> {}\n", stem, url),
        SyncProgressEvent::Hashed {
            document_id,
            content_hash,
            file_path,
            ..
        } => format!(
            "  document_id : {}\n  sha-256     : {}\n  file_path   : {}\n",
            document_id, content_hash, file_path
        ),
        SyncProgressEvent::Finished { outcome, .. } => match outcome {
            FileOutcome::Inserted { capture_id } => format!("  INSERTED  capture_id: {}\n", capture_id),
            FileOutcome::Updated { capture_id } => format!("  UPDATED   capture_id: {}\n", capture_id),
            FileOutcome::WouldInsert => "  would insert\n".to_string(),
            FileOutcome::Skipped => "  skipped\n".to_string(),
            FileOutcome::InvalidChoice { input } => {
                format!("  invalid choice '{}', skipped\n", input)
            }
            FileOutcome::HashFailed { error } => format!("  FAILED to hash: {}\n", error),
            FileOutcome::StoreFailed { error } => format!("  FAILED to store: {}\n", error),
        },
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl SyncProgressReporter for JsonProgress {
    fn report(&self, event: SyncProgressEvent) {
        let obj = json_event(&event);
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

fn json_event(event: &SyncProgressEvent) -> serde_json::Value {
    match event {
        SyncProgressEvent::Discovered {
            dir,
            files,
            dry_run,
        } => serde_json::json!({
            "event": "discovered",
            "dir": dir.display().to_string(),
            "files": files,
            "dry_run": dry_run
        }),
        SyncProgressEvent::Processing { file, n, total } => serde_json::json!({
            "event": "processing",
            "file": file,
            "n": n,
            "total": total
        }),
        SyncProgressEvent::StaleMapping { stem, url } => serde_json::json!({
            "event": "stale_mapping",
            "stem": stem,
            "url": url
        }),
        SyncProgressEvent::Mapped { stem, url } => serde_json::json!({
            "event": "mapped",
            "stem": stem,
            "url": url
        }),
        SyncProgressEvent::Hashed {
            file,
            document_id,
            content_hash,
            file_path,
        } => serde_json::json!({
            "event": "hashed",
            "file": file,
            "document_id": document_id,
            "content_hash": content_hash,
            "file_path": file_path
        }),
        SyncProgressEvent::Finished { file, outcome } => {
            let mut obj = serde_json::json!({ "event": "finished", "file": file });
            if let (Some(map), Ok(serde_json::Value::Object(fields))) =
                (obj.as_object_mut(), serde_json::to_value(outcome))
            {
                map.extend(fields);
            }
            obj
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl SyncProgressReporter for NoProgress {
    fn report(&self, _event: SyncProgressEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
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

    pub fn reporter(&self) -> Box<dyn SyncProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
