//! Configuration
//!
//! Loaded from YAML, then overridden from the environment:
//! `SHAPEHOUSE_DATA_DIR`, `SHAPEHOUSE_BASE_URI` and `SHAPEHOUSE_LOG`.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_DATA_DIR: &str = "SHAPEHOUSE_DATA_DIR";
pub const ENV_BASE_URI: &str = "SHAPEHOUSE_BASE_URI";
pub const ENV_LOG: &str = "SHAPEHOUSE_LOG";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding one subdirectory per warehouse (None = in-memory only)
    pub data_dir: Option<PathBuf>,
    /// Absolute http(s) base of every catalog URI
    pub base_uri: String,
    /// Accept types without shapes and properties outside closed shapes
    pub open_world: bool,
    /// Max log level: error, warn, info, debug or trace
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            base_uri: "http://localhost:8080".to_string(),
            open_world: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse YAML text; missing fields keep their defaults
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a YAML file, apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_yaml(&text)?
            }
            None => Self::default(),
        };
        config.apply_env_with(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(uri) = lookup(ENV_BASE_URI).filter(|v| !v.is_empty()) {
            self.base_uri = uri;
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
    }

    /// Check the base URI and log level. Trailing slashes are dropped.
    pub fn validate(&mut self) -> ConfigResult<()> {
        let trimmed = self.base_uri.trim().trim_end_matches('/').to_string();
        let rest = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "base_uri must be an absolute http(s) URI, got '{}'",
                    self.base_uri
                ))
            })?;
        if rest.is_empty() || rest.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "base_uri has no usable authority: '{}'",
                self.base_uri
            )));
        }
        self.base_uri = trimmed;

        let level = self.log_level.to_ascii_lowercase();
        if !matches!(level.as_str(), "error" | "warn" | "info" | "debug" | "trace") {
            return Err(ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)));
        }
        self.log_level = level;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let mut config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.base_uri, "http://localhost:8080");
        assert!(!config.open_world);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_yaml_partial() {
        let config = Config::from_yaml("open_world: true\ndata_dir: /var/lib/shapehouse\n").unwrap();
        assert!(config.open_world);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/shapehouse")));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_BASE_URI, "https://oslc.example.org/"),
            (ENV_LOG, "DEBUG"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.apply_env_with(|k| vars.get(k).map(|v| v.to_string()));
        config.validate().unwrap();
        assert_eq!(config.base_uri, "https://oslc.example.org");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_base_uri() {
        let mut config = Config {
            base_uri: "ftp://example.org".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.base_uri = "http://".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shapehouse.yaml");
        std::fs::write(&path, "base_uri: http://example.org/\nlog_level: warn\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log_level, "warn");
        assert!(config.base_uri.starts_with("http"));
        assert!(Config::load(Some(&dir.path().join("missing.yaml"))).is_err());
    }
}
