use anyhow::Result;

use crate::config::Config;
use crate::db;

/// Create the `sites`, `documents` and `captures` tables if they are missing.
///
/// Rows in `sites` and `documents` are owned by the ingestion process; this
/// only makes an empty database usable.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sites (
            site_id TEXT PRIMARY KEY,
            site_name TEXT NOT NULL,
            official_site_url TEXT
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            document_id TEXT PRIMARY KEY,
            site_id TEXT NOT NULL,
            url TEXT NOT NULL,
            title TEXT,
            official_category TEXT,
            FOREIGN KEY (site_id) REFERENCES sites(site_id)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS captures (
            capture_id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            captured_by TEXT NOT NULL,
            capture_ts TEXT NOT NULL,
            kind TEXT NOT NULL,
            http_status INTEGER,
            file_path TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            notes TEXT,
            UNIQUE(document_id, content_hash),
            FOREIGN KEY (document_id) REFERENCES documents(document_id)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_site_id ON documents(site_id)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_captures_document_id ON captures(document_id)")
        .execute(&pool)
        .await?;

    pool.close().await;
    Ok(())
}
