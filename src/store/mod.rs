//! Storage abstraction for the document catalog and capture records.
//!
//! The [`Store`] trait is the seam between the sync engine and the backing
//! database. [`SqliteStore`] is the production backend; [`InMemoryStore`]
//! serves tests and experiments.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`site_documents`](Store::site_documents) | Candidate documents for a capture folder |
//! | [`upsert_capture`](Store::upsert_capture) | Insert or update a capture, reporting which |
//! | [`capture_count`](Store::capture_count) | Total number of capture records |

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CaptureRecord, Document, UpsertOutcome};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Documents belonging to the site a capture folder is named after,
    /// in [`catalog`](crate::catalog) order. Empty if nothing matches.
    async fn site_documents(&self, site_folder: &str) -> Result<Vec<Document>>;

    /// Insert `record`, or, if a capture with the same document and content
    /// hash exists, update its file path and capture time only.
    async fn upsert_capture(&self, record: &CaptureRecord) -> Result<UpsertOutcome>;

    async fn capture_count(&self) -> Result<i64>;
}
