//! Site matching and candidate ordering for the document catalog.
//!
//! A capture folder is named after its site loosely (`trans-allegheny` for
//! "Trans Allegheny Lunatic Asylum", or a fragment of the site URL). A site
//! matches when its name contains the folder name with hyphens read as
//! spaces, or its URL contains the folder name, ignoring ASCII case.
//! SQLite's `lower()` folds only ASCII letters, so non-ASCII letters must
//! match exactly in both backends.
//!
//! Candidates are ordered by category with uncategorized documents last,
//! then by URL. The resolver numbers candidates in this order, so both store
//! backends must produce it.

use std::cmp::Ordering;

use crate::models::Document;

/// Needle compared against site names.
pub fn name_needle(site_folder: &str) -> String {
    site_folder.replace('-', " ").to_ascii_lowercase()
}

/// Needle compared against site URLs.
pub fn url_needle(site_folder: &str) -> String {
    site_folder.to_ascii_lowercase()
}

/// Wrap a needle as a `LIKE ... ESCAPE '\'` substring pattern.
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

pub fn site_matches(site_folder: &str, site_name: &str, site_url: Option<&str>) -> bool {
    if site_name.to_ascii_lowercase().contains(&name_needle(site_folder)) {
        return true;
    }
    site_url
        .map(|u| u.to_ascii_lowercase().contains(&url_needle(site_folder)))
        .unwrap_or(false)
}

pub fn candidate_order(a: &Document, b: &Document) -> Ordering {
    let by_category = match (&a.category, &b.category) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_category.then_with(|| a.url.cmp(&b.url))
}

pub fn sort_candidates(docs: &mut [Document]) {
    docs.sort_by(candidate_order);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(url: &str, category: Option<&str>) -> Document {
        Document {
            document_id: url.rsplit('/').next().unwrap().to_string(),
            url: url.to_string(),
            title: None,
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn folder_matches_name_or_url() {
        assert!(site_matches(
            "trans-allegheny",
            "Trans Allegheny Lunatic Asylum",
            None
        ));
        assert!(site_matches(
            "trans-allegheny",
            "TALA",
            Some("https://www.Trans-Allegheny.example")
        ));
        assert!(!site_matches(
            "trans-allegheny",
            "Waverly Hills",
            Some("https://waverly.example")
        ));
    }

    #[test]
    fn only_ascii_letters_fold() {
        assert!(site_matches("ärzte-haus", "ärzte Haus", None));
        assert!(site_matches("Ärzte-HAUS", "Ärzte haus", None));
        assert!(!site_matches("ärzte-haus", "Ärzte Haus", None));
        assert_eq!(name_needle("Ärzte-Haus"), "Ärzte haus");
    }

    #[test]
    fn hyphen_only_relaxed_for_names() {
        // The URL needle keeps the hyphen.
        assert!(!site_matches("north-pier", "Pier", Some("https://northpier.example")));
        assert!(site_matches("north-pier", "The North Pier", None));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("trans allegheny"), "%trans allegheny%");
        assert_eq!(like_pattern("a_b%c\\d"), "%a\\_b\\%c\\\\d%");
    }

    #[test]
    fn uncategorized_sort_last_then_by_url() {
        let mut docs = vec![
            doc("https://x.example/doc/3", None),
            doc("https://x.example/doc/2", Some("reports")),
            doc("https://x.example/doc/1", None),
            doc("https://x.example/doc/4", Some("maps")),
            doc("https://x.example/doc/0", Some("reports")),
        ];
        sort_candidates(&mut docs);
        let ids: Vec<&str> = docs.iter().map(|d| d.document_id.as_str()).collect();
        assert_eq!(ids, vec!["4", "0", "2", "1", "3"]);
    }
}
