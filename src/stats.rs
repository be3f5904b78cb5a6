//! Per-site capture statistics.
//!
//! `capsync stats --site <site>` shows the catalog documents for a site, how
//! many captures each has and when it was last captured, plus the health of
//! the site's `mapping.json` (entries whose URL the catalog no longer knows).

use anyhow::Result;
use sqlx::Row;

use crate::catalog::{like_pattern, name_needle, url_needle};
use crate::config::Config;
use crate::db;
use crate::mapping::{Mapping, MappingStore};
use crate::models::Document;
use crate::store::{SqliteStore, Store};

/// Per-document capture counts.
struct DocumentStats {
    label: String,
    category: Option<String>,
    capture_count: i64,
    last_capture: Option<String>,
}

/// Mapping entries checked against the current catalog.
#[derive(Debug, PartialEq, Eq)]
pub struct MappingHealth {
    pub entries: usize,
    /// Stems whose URL matches no catalog document, sorted.
    pub stale: Vec<String>,
    /// Catalog documents no stem maps to.
    pub unmapped_documents: usize,
}

pub fn mapping_health(mapping: &Mapping, candidates: &[Document]) -> MappingHealth {
    let stale = mapping
        .iter()
        .filter(|(_, url)| !candidates.iter().any(|d| &d.url == *url))
        .map(|(stem, _)| stem.clone())
        .collect();
    let unmapped_documents = candidates
        .iter()
        .filter(|d| !mapping.values().any(|url| url == &d.url))
        .count();
    MappingHealth {
        entries: mapping.len(),
        stale,
        unmapped_documents,
    }
}

pub async fn run_stats(config: &Config, site: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);

    let candidates = store.site_documents(site).await?;
    let total_captures = store.capture_count().await?;

    let rows = sqlx::query(
        r#"
        SELECT d.url, d.title, d.official_category,
               COUNT(c.capture_id) AS capture_count,
               MAX(c.capture_ts) AS last_capture
        FROM documents d
        JOIN sites s ON s.site_id = d.site_id
        LEFT JOIN captures c ON c.document_id = d.document_id
        WHERE lower(s.site_name) LIKE ? ESCAPE '\'
           OR lower(s.official_site_url) LIKE ? ESCAPE '\'
        GROUP BY d.document_id
        ORDER BY d.official_category IS NULL, d.official_category, d.url
        "#,
    )
    .bind(like_pattern(&name_needle(site)))
    .bind(like_pattern(&url_needle(site)))
    .fetch_all(store.pool())
    .await?;

    let doc_stats: Vec<DocumentStats> = rows
        .iter()
        .map(|row| {
            let url: String = row.get("url");
            let title: Option<String> = row.get("title");
            DocumentStats {
                label: title.filter(|t| !t.is_empty()).unwrap_or(url),
                category: row.get("official_category"),
                capture_count: row.get("capture_count"),
                last_capture: row.get("last_capture"),
            }
        })
        .collect();

    let mapping = MappingStore::load(&config.captures.site_dir(site))?;
    let health = mapping_health(mapping.entries(), &candidates);

    let site_captures: i64 = doc_stats.iter().map(|d| d.capture_count).sum();
    let captured_docs = doc_stats.iter().filter(|d| d.capture_count > 0).count();

    println!("Captures for site '{}'", site);
    println!("================================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Documents:   {}", candidates.len());
    println!("  Captured:    {} / {}", captured_docs, candidates.len());
    println!("  Captures:    {} (all sites: {})", site_captures, total_captures);
    println!();
    println!("  Mapping:     {}", mapping.path().display());
    println!("  Entries:     {}", health.entries);
    println!("  Stale:       {}", health.stale.len());
    for stem in &health.stale {
        println!("    - {}", stem);
    }
    println!("  Unmapped documents: {}", health.unmapped_documents);

    if !doc_stats.is_empty() {
        println!();
        println!(
            "  {:<48} {:<16} {:>8}   {}",
            "DOCUMENT", "CATEGORY", "CAPTURES", "LAST CAPTURE"
        );
        println!("  {}", "-".repeat(90));
        for d in &doc_stats {
            println!(
                "  {:<48} {:<16} {:>8}   {}",
                truncate(&d.label, 48),
                d.category.as_deref().unwrap_or("-"),
                d.capture_count,
                d.last_capture
                    .as_deref()
                    .map(format_capture_date)
                    .unwrap_or_else(|| "never".to_string())
            );
        }
    }

    println!();

    store.pool().close().await;
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn format_capture_date(ts: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> Document {
        Document {
            document_id: id.to_string(),
            url: format!("https://example.org/doc/{}", id),
            title: None,
            category: None,
        }
    }

    #[test]
    fn health_flags_stale_and_unmapped() {
        let mut mapping = Mapping::new();
        mapping.insert("north-tower".into(), "https://example.org/doc/7".into());
        mapping.insert("annex".into(), "https://example.org/old/3".into());
        mapping.insert("north-tower-2".into(), "https://example.org/doc/7".into());

        let health = mapping_health(&mapping, &[doc("7"), doc("8"), doc("9")]);
        assert_eq!(
            health,
            MappingHealth {
                entries: 3,
                stale: vec!["annex".to_string()],
                unmapped_documents: 2,
            }
        );
    }

    #[test]
    fn truncates_long_labels() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn capture_dates() {
        assert_eq!(format_capture_date("2026-02-16T12:00:00+00:00"), "2026-02-16");
        assert_eq!(format_capture_date("garbage"), "garbage");
    }
}
