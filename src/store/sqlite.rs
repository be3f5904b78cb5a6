//! SQLite-backed [`Store`] implementation.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::catalog::{like_pattern, name_needle, url_needle};
use crate::models::{CaptureRecord, Document, UpsertOutcome};

use super::Store;

/// Wraps a [`SqlitePool`] over the `sites`, `documents` and `captures`
/// tables created by [`migrate`](crate::migrate).
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn site_documents(&self, site_folder: &str) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            r#"
            SELECT d.document_id, d.url, d.title, d.official_category
            FROM documents d
            JOIN sites s ON s.site_id = d.site_id
            WHERE lower(s.site_name) LIKE ? ESCAPE '\'
               OR lower(s.official_site_url) LIKE ? ESCAPE '\'
            ORDER BY d.official_category IS NULL, d.official_category, d.url
            "#,
        )
        .bind(like_pattern(&name_needle(site_folder)))
        .bind(like_pattern(&url_needle(site_folder)))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Document {
                document_id: row.get("document_id"),
                url: row.get("url"),
                title: row.get("title"),
                category: row.get("official_category"),
            })
            .collect())
    }

    async fn upsert_capture(&self, record: &CaptureRecord) -> Result<UpsertOutcome> {
        // On conflict the existing row keeps its id, so the returned id tells
        // the two branches apart.
        let capture_id: String = sqlx::query_scalar(
            r#"
            INSERT INTO captures (capture_id, document_id, captured_by, capture_ts,
                                  kind, http_status, file_path, content_hash, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(document_id, content_hash) DO UPDATE SET
                file_path = excluded.file_path,
                capture_ts = excluded.capture_ts
            RETURNING capture_id
            "#,
        )
        .bind(&record.capture_id)
        .bind(&record.document_id)
        .bind(&record.captured_by)
        .bind(record.capture_ts.to_rfc3339())
        .bind(&record.kind)
        .bind(record.http_status)
        .bind(&record.file_path)
        .bind(&record.content_hash)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await?;

        if capture_id == record.capture_id {
            Ok(UpsertOutcome::Inserted { capture_id })
        } else {
            Ok(UpsertOutcome::Updated { capture_id })
        }
    }

    async fn capture_count(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM captures")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
