//! TOML configuration for `capsync`.
//!
//! ```toml
//! [db]
//! path = "./data/captures.sqlite"
//!
//! [captures]
//! root = "/home/me/Documents/PhD/Captures"
//! path_base = "/home/me"
//! include_glob = "*.pdf"
//!
//! [actor]
//! id = "36339282-36e1-41b8-ad8b-bba0fff72e64"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub captures: CapturesConfig,
    pub actor: ActorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CapturesConfig {
    /// Directory holding one folder per site.
    pub root: PathBuf,
    /// Stored file paths are made relative to this directory.
    /// Defaults to `root`.
    #[serde(default)]
    pub path_base: Option<PathBuf>,
    #[serde(default = "default_include_glob")]
    pub include_glob: String,
}

fn default_include_glob() -> String {
    "*.pdf".to_string()
}

/// Who is recorded as having made the captures.
#[derive(Debug, Deserialize, Clone)]
pub struct ActorConfig {
    pub id: String,
}

impl CapturesConfig {
    pub fn site_dir(&self, site: &str) -> PathBuf {
        self.root.join(site)
    }

    pub fn date_dir(&self, site: &str, date: &str) -> PathBuf {
        self.site_dir(site).join(date)
    }

    pub fn path_base(&self) -> &Path {
        self.path_base.as_deref().unwrap_or(&self.root)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.actor.id.trim().is_empty() {
        anyhow::bail!("actor.id must be set");
    }
    uuid::Uuid::parse_str(config.actor.id.trim())
        .with_context(|| format!("actor.id is not a valid UUID: '{}'", config.actor.id))?;

    if !config.captures.root.starts_with(config.captures.path_base()) {
        anyhow::bail!(
            "captures.root ({}) must be inside captures.path_base ({})",
            config.captures.root.display(),
            config.captures.path_base().display()
        );
    }

    globset::Glob::new(&config.captures.include_glob).with_context(|| {
        format!(
            "captures.include_glob is not a valid glob: '{}'",
            config.captures.include_glob
        )
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Config {
        toml::from_str(toml_src).unwrap()
    }

    const BASE: &str = r#"
[db]
path = "/tmp/caps.sqlite"

[captures]
root = "/home/me/Captures"

[actor]
id = "36339282-36e1-41b8-ad8b-bba0fff72e64"
"#;

    #[test]
    fn defaults_apply() {
        let cfg = parse(BASE);
        assert!(validate(&cfg).is_ok());
        assert_eq!(cfg.captures.include_glob, "*.pdf");
        assert_eq!(cfg.captures.path_base(), Path::new("/home/me/Captures"));
        assert_eq!(
            cfg.captures.date_dir("north", "2026-02-16"),
            PathBuf::from("/home/me/Captures/north/2026-02-16")
        );
    }

    #[test]
    fn rejects_bad_actor_id() {
        let cfg = parse(&BASE.replace("36339282-36e1-41b8-ad8b-bba0fff72e64", "researcher"));
        let err = validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("actor.id"));
    }

    #[test]
    fn rejects_root_outside_path_base() {
        let src = BASE.replace(
            "root = \"/home/me/Captures\"",
            "root = \"/home/me/Captures\"\npath_base = \"/srv\"",
        );
        let err = validate(&parse(&src)).unwrap_err();
        assert!(err.to_string().contains("path_base"));
    }

    #[test]
    fn accepts_root_under_path_base() {
        let src = BASE.replace(
            "root = \"/home/me/Captures\"",
            "root = \"/home/me/Captures\"\npath_base = \"/home/me\"",
        );
        let cfg = parse(&src);
        assert!(validate(&cfg).is_ok());
        assert_eq!(cfg.captures.path_base(), Path::new("/home/me"));
    }
}
