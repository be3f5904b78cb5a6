//! Capture sync orchestration.
//!
//! Coordinates one run over `<captures.root>/<site>/<date>`: enumerate the
//! capture files → resolve each to a catalog document → hash → upsert the
//! capture record. Files are processed one at a time, in file-name order,
//! and each upsert commits on its own, so an interrupted run can simply be
//! repeated.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::Config;
use crate::db;
use crate::error::SyncError;
use crate::hasher::sha256_file;
use crate::mapping::MappingStore;
use crate::models::{
    CaptureFile, CaptureRecord, Document, FileOutcome, SyncSummary, CAPTURE_HTTP_STATUS,
    CAPTURE_KIND,
};
use crate::progress::{ProgressMode, SyncProgressEvent, SyncProgressReporter};
use crate::resolver::{resolve, ConsolePrompt, DecisionProvider, Resolution};
use crate::store::{SqliteStore, Store};

/// What to do when the capture store rejects a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreErrorPolicy {
    /// Stop the run. Captures already written stay written.
    #[default]
    Abort,
    /// Count the file as failed and move on.
    Continue,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub site: String,
    pub date: NaiveDate,
    pub dry_run: bool,
    pub on_store_error: StoreErrorPolicy,
}

/// Parse a `YYYY-MM-DD` capture folder date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, SyncError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| SyncError::InvalidDate(raw.to_string()))
}

/// Captures carry noon UTC on the folder date; the exact time is not known.
pub fn capture_timestamp(date: NaiveDate) -> Result<DateTime<Utc>> {
    date.and_hms_opt(12, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| anyhow::anyhow!("no noon on {}", date))
}

/// Path of `path` relative to `base`, with `/` separators.
pub fn relative_path(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

/// Files directly inside `dir` whose name matches `include_glob`, sorted by
/// file name.
///
/// Symlinks count as files unless they point at a directory. A dangling
/// link is still listed so that hashing reports it as a failed file.
pub fn list_capture_files(dir: &Path, include_glob: &str) -> Result<Vec<CaptureFile>> {
    let matcher = build_matcher(include_glob)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let file_type = entry.file_type();
        let is_file = file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir());
        if !is_file {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !matcher.is_match(&file_name) {
            continue;
        }
        let path = entry.path().to_path_buf();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.clone());
        files.push(CaptureFile {
            path,
            file_name,
            stem,
        });
    }

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

fn build_matcher(pattern: &str) -> Result<GlobMatcher> {
    Ok(GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// Drives one sync run against a [`Store`].
pub struct SyncEngine<'a> {
    config: &'a Config,
    store: &'a dyn Store,
    decisions: &'a mut dyn DecisionProvider,
    reporter: &'a dyn SyncProgressReporter,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        config: &'a Config,
        store: &'a dyn Store,
        decisions: &'a mut dyn DecisionProvider,
        reporter: &'a dyn SyncProgressReporter,
    ) -> Self {
        Self {
            config,
            store,
            decisions,
            reporter,
        }
    }

    pub async fn run(&mut self, opts: &SyncOptions) -> Result<SyncSummary> {
        let captures = &self.config.captures;
        let date_str = opts.date.format("%Y-%m-%d").to_string();
        let site_dir = captures.site_dir(&opts.site);
        let date_dir = captures.date_dir(&opts.site, &date_str);

        if !date_dir.is_dir() {
            return Err(SyncError::FolderNotFound(date_dir).into());
        }

        let files = list_capture_files(&date_dir, &captures.include_glob)?;
        let mut summary = SyncSummary {
            dry_run: opts.dry_run,
            ..SyncSummary::default()
        };

        self.reporter.report(SyncProgressEvent::Discovered {
            dir: date_dir.clone(),
            files: files.len() as u64,
            dry_run: opts.dry_run,
        });
        if files.is_empty() {
            return Ok(summary);
        }

        let candidates = self
            .store
            .site_documents(&opts.site)
            .await
            .with_context(|| format!("Failed to load catalog for site '{}'", opts.site))?;
        if candidates.is_empty() {
            return Err(SyncError::EmptyCatalog {
                site: opts.site.clone(),
            }
            .into());
        }
        tracing::debug!(site = %opts.site, candidates = candidates.len(), "catalog loaded");

        let mut mapping = MappingStore::load(&site_dir)?;
        let capture_ts = capture_timestamp(opts.date)?;
        let total = files.len() as u64;

        for (i, file) in files.iter().enumerate() {
            self.reporter.report(SyncProgressEvent::Processing {
                file: file.file_name.clone(),
                n: i as u64 + 1,
                total,
            });

            let outcome = self
                .sync_file(file, &candidates, &mut mapping, capture_ts, opts)
                .await?;

            summary.files += 1;
            summary.record(&outcome);
            self.reporter.report(SyncProgressEvent::Finished {
                file: file.file_name.clone(),
                outcome,
            });
        }

        Ok(summary)
    }

    async fn sync_file(
        &mut self,
        file: &CaptureFile,
        candidates: &[Document],
        mapping: &mut MappingStore,
        capture_ts: DateTime<Utc>,
        opts: &SyncOptions,
    ) -> Result<FileOutcome> {
        let resolution = resolve(
            &file.stem,
            candidates,
            mapping,
            &mut *self.decisions,
            self.reporter,
        )?;
        let document_id = match resolution {
            Resolution::Mapped { document_id } | Resolution::Assigned { document_id, .. } => {
                document_id
            }
            Resolution::Skipped => return Ok(FileOutcome::Skipped),
            Resolution::InvalidInput { input } => {
                return Ok(FileOutcome::InvalidChoice { input })
            }
        };

        let content_hash = match sha256_file(&file.path) {
            Ok(h) => h,
            Err(e) => {
                tracing::debug!(file = %file.path.display(), error = %e, "hashing failed");
                return Ok(FileOutcome::HashFailed {
                    error: format!("{:#}", e),
                });
            }
        };
        let file_path = relative_path(&file.path, self.config.captures.path_base());

        self.reporter.report(SyncProgressEvent::Hashed {
            file: file.file_name.clone(),
            document_id: document_id.clone(),
            content_hash: content_hash.clone(),
            file_path: file_path.clone(),
        });

        if opts.dry_run {
            return Ok(FileOutcome::WouldInsert);
        }

        let record = CaptureRecord {
            capture_id: Uuid::new_v4().to_string(),
            document_id,
            captured_by: self.config.actor.id.trim().to_string(),
            capture_ts,
            kind: CAPTURE_KIND.to_string(),
            http_status: Some(CAPTURE_HTTP_STATUS),
            file_path,
            content_hash,
            notes: None,
        };

        match self.store.upsert_capture(&record).await {
            Ok(outcome) => {
                tracing::debug!(file = %file.file_name, capture_id = outcome.capture_id(), "capture stored");
                Ok(outcome.into())
            }
            Err(e) => match opts.on_store_error {
                StoreErrorPolicy::Abort => {
                    Err(e.context(format!("Failed to store capture for {}", file.file_name)))
                }
                StoreErrorPolicy::Continue => {
                    tracing::debug!(file = %file.file_name, error = %e, "upsert failed");
                    Ok(FileOutcome::StoreFailed {
                        error: format!("{:#}", e),
                    })
                }
            },
        }
    }
}

/// `capsync sync`: run the engine against the configured database with an
/// interactive prompt and print the summary.
pub async fn run_sync(
    config: &Config,
    site: &str,
    date: &str,
    dry_run: bool,
    keep_going: bool,
    progress: ProgressMode,
) -> Result<()> {
    let opts = SyncOptions {
        site: site.to_string(),
        date: parse_date(date)?,
        dry_run,
        on_store_error: if keep_going {
            StoreErrorPolicy::Continue
        } else {
            StoreErrorPolicy::Abort
        },
    };

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let reporter = progress.reporter();
    let stdin = std::io::stdin();
    let mut prompt = ConsolePrompt::new(stdin.lock(), std::io::stderr());

    let result = SyncEngine::new(config, &store, &mut prompt, reporter.as_ref())
        .run(&opts)
        .await;
    store.pool().close().await;
    let summary = result?;

    print_summary(site, date, &summary);
    Ok(())
}

fn print_summary(site: &str, date: &str, summary: &SyncSummary) {
    if summary.dry_run {
        println!("sync {} {} (dry-run)", site, date);
    } else {
        println!("sync {} {}", site, date);
    }
    println!("  files: {}", summary.files);
    if summary.dry_run {
        println!("  would insert: {}", summary.inserted);
    } else {
        println!("  inserted: {}", summary.inserted);
        println!("  updated: {}", summary.updated);
    }
    println!("  skipped: {}", summary.skipped);
    println!("  invalid choices: {}", summary.invalid);
    println!("  failed: {}", summary.failed);
    println!("ok");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn capture_time_is_noon_utc() {
        let date = parse_date("2026-02-16").unwrap();
        assert_eq!(
            capture_timestamp(date).unwrap().to_rfc3339(),
            "2026-02-16T12:00:00+00:00"
        );
    }

    #[test]
    fn bad_dates_are_rejected() {
        assert!(matches!(parse_date("16/02/2026"), Err(SyncError::InvalidDate(_))));
        assert!(matches!(parse_date("2026-02-30"), Err(SyncError::InvalidDate(_))));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let base = Path::new("/home/me");
        let path = Path::new("/home/me/Captures/north/2026-02-16/north-tower.pdf");
        assert_eq!(
            relative_path(path, base),
            "Captures/north/2026-02-16/north-tower.pdf"
        );
    }

    #[test]
    fn lists_only_matching_files_in_name_order() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        std::fs::write(dir.join("b.pdf"), b"b").unwrap();
        std::fs::write(dir.join("A.PDF"), b"a").unwrap();
        std::fs::write(dir.join("notes.txt"), b"n").unwrap();
        std::fs::create_dir(dir.join("nested.pdf")).unwrap();
        std::fs::write(dir.join("nested.pdf").join("c.pdf"), b"c").unwrap();

        let files = list_capture_files(dir, "*.pdf").unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["A.PDF", "b.pdf"]);
        assert_eq!(files[0].stem, "A");
        assert_eq!(files[1].stem, "b");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_listed() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let store = tmp.path().join("store");
        let dir = tmp.path().join("2026-02-16");
        std::fs::create_dir_all(&store).unwrap();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(store.join("real.pdf"), b"%PDF north tower").unwrap();
        std::fs::create_dir(store.join("folder.pdf")).unwrap();

        symlink(store.join("real.pdf"), dir.join("north-tower.pdf")).unwrap();
        symlink(store.join("missing.pdf"), dir.join("south-tower.pdf")).unwrap();
        symlink(store.join("folder.pdf"), dir.join("linked-dir.pdf")).unwrap();

        let files = list_capture_files(&dir, "*.pdf").unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["north-tower.pdf", "south-tower.pdf"]);
        assert!(sha256_file(&files[0].path).is_ok());
        assert!(sha256_file(&files[1].path).is_err());
    }
}
