//! In-memory [`Store`] implementation for tests.
//!
//! Uses `Vec` and `HashMap` behind `std::sync::RwLock`. Site matching and
//! candidate ordering go through [`catalog`](crate::catalog), the same rules
//! the SQLite query encodes.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::catalog::{site_matches, sort_candidates};
use crate::models::{CaptureRecord, Document, UpsertOutcome};

use super::Store;

struct StoredSite {
    site_id: String,
    name: String,
    url: Option<String>,
}

struct StoredDocument {
    site_id: String,
    doc: Document,
}

/// In-memory store for tests.
pub struct InMemoryStore {
    sites: RwLock<Vec<StoredSite>>,
    documents: RwLock<Vec<StoredDocument>>,
    /// Keyed by (document_id, content_hash).
    captures: RwLock<HashMap<(String, String), CaptureRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            sites: RwLock::new(Vec::new()),
            documents: RwLock::new(Vec::new()),
            captures: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_site(&self, site_id: &str, name: &str, url: Option<&str>) {
        self.sites.write().unwrap().push(StoredSite {
            site_id: site_id.to_string(),
            name: name.to_string(),
            url: url.map(str::to_string),
        });
    }

    pub fn add_document(&self, site_id: &str, doc: Document) -> Result<()> {
        if !self.sites.read().unwrap().iter().any(|s| s.site_id == site_id) {
            bail!("unknown site: {}", site_id);
        }
        self.documents.write().unwrap().push(StoredDocument {
            site_id: site_id.to_string(),
            doc,
        });
        Ok(())
    }

    /// Snapshot of all capture records, sorted by file path.
    pub fn captures(&self) -> Vec<CaptureRecord> {
        let mut out: Vec<CaptureRecord> =
            self.captures.read().unwrap().values().cloned().collect();
        out.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        out
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn site_documents(&self, site_folder: &str) -> Result<Vec<Document>> {
        let sites = self.sites.read().unwrap();
        let site_ids: Vec<&str> = sites
            .iter()
            .filter(|s| site_matches(site_folder, &s.name, s.url.as_deref()))
            .map(|s| s.site_id.as_str())
            .collect();

        let mut docs: Vec<Document> = self
            .documents
            .read()
            .unwrap()
            .iter()
            .filter(|d| site_ids.contains(&d.site_id.as_str()))
            .map(|d| d.doc.clone())
            .collect();
        sort_candidates(&mut docs);
        Ok(docs)
    }

    async fn upsert_capture(&self, record: &CaptureRecord) -> Result<UpsertOutcome> {
        let mut captures = self.captures.write().unwrap();
        let key = (record.document_id.clone(), record.content_hash.clone());
        match captures.get_mut(&key) {
            Some(existing) => {
                existing.file_path = record.file_path.clone();
                existing.capture_ts = record.capture_ts;
                Ok(UpsertOutcome::Updated {
                    capture_id: existing.capture_id.clone(),
                })
            }
            None => {
                captures.insert(key, record.clone());
                Ok(UpsertOutcome::Inserted {
                    capture_id: record.capture_id.clone(),
                })
            }
        }
    }

    async fn capture_count(&self) -> Result<i64> {
        Ok(self.captures.read().unwrap().len() as i64)
    }
}
