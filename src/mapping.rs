//! Per-site `mapping.json`: file stem → document URL.
//!
//! The file is a flat JSON object written with sorted keys and two-space
//! indentation so it diffs cleanly. Writes go to a temporary sibling and are
//! renamed into place, so a failed write leaves the previous file intact.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const MAPPING_FILE: &str = "mapping.json";

pub type Mapping = BTreeMap<String, String>;

pub fn mapping_path(site_dir: &Path) -> PathBuf {
    site_dir.join(MAPPING_FILE)
}

/// Read the site's mapping. A missing file is an empty mapping.
pub fn load_mapping(site_dir: &Path) -> Result<Mapping> {
    let path = mapping_path(site_dir);
    if !path.exists() {
        return Ok(Mapping::new());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mapping: Mapping = serde_json::from_str(&content).with_context(|| {
        format!(
            "{} must be a JSON object of filename stems to document URLs",
            path.display()
        )
    })?;
    Ok(mapping)
}

/// Replace the site's mapping file with `mapping`.
pub fn save_mapping(site_dir: &Path, mapping: &Mapping) -> Result<()> {
    let path = mapping_path(site_dir);
    let tmp = site_dir.join(format!(".{}.tmp", MAPPING_FILE));

    let mut body = serde_json::to_string_pretty(mapping)?;
    body.push('\n');

    std::fs::write(&tmp, body).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, &path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    tracing::debug!(path = %path.display(), entries = mapping.len(), "mapping saved");
    Ok(())
}

/// A site's mapping together with the directory it is persisted in.
#[derive(Debug)]
pub struct MappingStore {
    site_dir: PathBuf,
    entries: Mapping,
}

impl MappingStore {
    pub fn load(site_dir: &Path) -> Result<Self> {
        Ok(Self {
            site_dir: site_dir.to_path_buf(),
            entries: load_mapping(site_dir)?,
        })
    }

    pub fn get(&self, stem: &str) -> Option<&str> {
        self.entries.get(stem).map(String::as_str)
    }

    /// Map `stem` to `url` and persist immediately.
    pub fn assign(&mut self, stem: &str, url: &str) -> Result<()> {
        self.entries.insert(stem.to_string(), url.to_string());
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        save_mapping(&self.site_dir, &self.entries)
    }

    pub fn entries(&self) -> &Mapping {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> PathBuf {
        mapping_path(&self.site_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(load_mapping(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn save_is_sorted_and_indented() {
        let tmp = TempDir::new().unwrap();
        let mut m = Mapping::new();
        m.insert("zeta".into(), "https://example.org/z".into());
        m.insert("alpha".into(), "https://example.org/a".into());
        save_mapping(tmp.path(), &m).unwrap();

        let raw = std::fs::read_to_string(mapping_path(tmp.path())).unwrap();
        assert_eq!(
            raw,
            "{\n  \"alpha\": \"https://example.org/a\",\n  \"zeta\": \"https://example.org/z\"\n}\n"
        );
        assert!(!tmp.path().join(".mapping.json.tmp").exists());
        assert_eq!(load_mapping(tmp.path()).unwrap(), m);
    }

    #[test]
    fn assign_persists_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let mut store = MappingStore::load(tmp.path()).unwrap();
        store.assign("north-tower", "https://example.org/doc/7").unwrap();
        store.assign("north-tower", "https://example.org/doc/8").unwrap();
        store.assign("south-tower", "https://example.org/doc/8").unwrap();

        let reloaded = MappingStore::load(tmp.path()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("north-tower"), Some("https://example.org/doc/8"));
        assert_eq!(reloaded.get("south-tower"), Some("https://example.org/doc/8"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(mapping_path(tmp.path()), "[1, 2, 3]").unwrap();
        let err = load_mapping(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("mapping.json"));
    }
}
