//! Configuration handling for the command line tool

use crate::pages;
use crate::rules::{PageSet, RulesFile};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToggleConfig {
    /// Rules file merged over the built-in pages
    pub rules_path: Option<PathBuf>,
    /// `tracing` filter directive, e.g. `field_toggle=debug`
    pub log_filter: Option<String>,
}

impl ToggleConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "field-toggle", "field-toggle")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the user config dir, defaulting when absent
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`, defaulting when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: ToggleConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the user config dir
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Read and parse a rules file without building its pages
pub fn read_rules(path: &Path) -> Result<RulesFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read rules file {}", path.display()))?;
    RulesFile::from_json(&content).with_context(|| format!("invalid rules file {}", path.display()))
}

/// Built-in pages, with pages from `rules_path` replacing same-named ones
pub fn load_pages(rules_path: Option<&Path>) -> Result<PageSet> {
    let mut pages = pages::builtin()?;
    if let Some(path) = rules_path {
        pages.extend(read_rules(path)?.build()?);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ToggleConfig::default();
        assert!(config.rules_path.is_none());
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn test_serialization() {
        let config = ToggleConfig {
            rules_path: Some(PathBuf::from("/etc/field-toggle/rules.json")),
            log_filter: Some("field_toggle=debug".to_string()),
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: ToggleConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(
            parsed.rules_path,
            Some(PathBuf::from("/etc/field-toggle/rules.json"))
        );
        assert_eq!(parsed.log_filter, Some("field_toggle=debug".to_string()));
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: ToggleConfig = serde_json::from_str("{}").unwrap();
        assert!(parsed.rules_path.is_none());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        // Should ignore unknown fields
        let json = r#"{"log_filter": "warn", "unknown_field": "value"}"#;
        let parsed: ToggleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.log_filter, Some("warn".to_string()));
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = ToggleConfig::load_from(&dir.path().join("missing.json")).unwrap();
        assert!(config.rules_path.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved/config.json");
        let config = ToggleConfig {
            log_filter: Some("field_toggle=trace".to_string()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = ToggleConfig::load_from(&path).unwrap();
        assert_eq!(loaded.log_filter, config.log_filter);
    }

    #[test]
    fn test_load_pages_without_file_is_builtin() {
        let pages = load_pages(None).unwrap();
        assert_eq!(pages.len(), 5);
    }

    #[test]
    fn test_read_rules_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_rules(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read rules file"));
    }

    #[test]
    fn test_load_pages_overrides_builtin() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("override.json");
        fs::write(
            &path,
            r#"{"pages": [
                {"page": "products", "driver": "kind",
                 "rules": [{"values": ["food"], "show": ["recipe"], "hide": ["stock"]}],
                 "fallback": {"show": ["stock"], "hide": ["recipe"]}},
                {"page": "suppliers", "driver": "supplier-type",
                 "fallback": {"show": ["cnpj"]}}
            ]}"#,
        )
        .unwrap();

        let pages = load_pages(Some(path.as_path())).unwrap();
        assert_eq!(pages.len(), 6);
        assert_eq!(pages.get("products").unwrap().driver.as_str(), "kind");
        assert!(pages.get("suppliers").is_some());
    }

    #[test]
    fn test_load_pages_reports_bad_rules() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"pages\": [").unwrap();

        let err = load_pages(Some(path.as_path())).unwrap_err();
        assert!(err.to_string().contains("invalid rules file"));
    }
}
