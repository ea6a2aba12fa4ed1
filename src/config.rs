use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Profile lookup proxy. Lookups are skipped entirely when unset.
    pub lookup_url: Option<String>,

    #[serde(default = "default_refresh_on_start")]
    pub refresh_on_start: bool,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("note-checklist");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("checklist.db").to_string_lossy().to_string()
}

fn default_refresh_on_start() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            lookup_url: None,
            refresh_on_start: default_refresh_on_start(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("note-checklist")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = Config::from_toml("db_path = \"/tmp/x.db\"").unwrap();
        assert_eq!(config.db_path, "/tmp/x.db");
        assert!(config.lookup_url.is_none());
        assert!(config.refresh_on_start);
    }

    #[test]
    fn test_lookup_url_is_read() {
        let config = Config::from_toml(
            "lookup_url = \"https://proxy.example/\"\nrefresh_on_start = false",
        )
        .unwrap();
        assert_eq!(config.lookup_url.as_deref(), Some("https://proxy.example/"));
        assert!(!config.refresh_on_start);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml("refresh_on_start = \"maybe\""),
            Err(AppError::TomlDe(_))
        ));
    }
}
