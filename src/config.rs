//! Configuration management for the service.
//!
//! This module handles loading and validating the server and model
//! configuration in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_DIR_NAME;

/// Network settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Locations of the model resources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelConfig {
    /// Safetensors file with the classifier weights
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// CSV file with one label per model output class
    #[serde(default = "default_label_path")]
    pub label_path: PathBuf,
    /// Class index meaning "no confident class", if the model defines one
    #[serde(default)]
    pub reserved_index: Option<usize>,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model").join("sign_model.safetensors")
}

fn default_label_path() -> PathBuf {
    PathBuf::from("model").join("label.csv")
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            label_path: default_label_path(),
            reserved_index: None,
        }
    }
}

impl ModelConfig {
    /// Resolves relative resource paths against `base`.
    ///
    /// Absolute paths are left untouched.
    #[must_use]
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        self.model_path = resolve_path(&self.model_path, base);
        self.label_path = resolve_path(&self.label_path, base);
        self
    }
}

/// Joins a relative `path` onto `base`.
///
/// Absolute and empty paths are returned unchanged, so an empty path still
/// fails [`Config::validate`].
#[must_use]
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.as_os_str().is_empty() || path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Service configuration.
///
/// # File Location
///
/// - Linux: `~/.config/SignApi/config.toml`
/// - macOS: `~/Library/Application Support/SignApi/config.toml`
/// - Windows: `%APPDATA%\SignApi\config.toml`
///
/// Both sections are optional in the file; missing values use defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Model resource settings
    #[serde(default)]
    pub model: ModelConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - `host` is not empty and `port` is not 0
    /// - model and label paths are not empty
    ///
    /// Whether the model files exist is not checked here; a missing model
    /// leaves the server running but unavailable.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            anyhow::bail!("Server host cannot be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.model.model_path.as_os_str().is_empty() {
            anyhow::bail!("Model path cannot be empty");
        }

        if self.model.label_path.as_os_str().is_empty() {
            anyhow::bail!("Label path cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.model.reserved_index, None);
        assert!(config.model.model_path.ends_with("sign_model.safetensors"));
    }

    #[test]
    fn test_config_validate() {
        let config = Config::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_rejects_bad_server() {
        let mut config = Config::new();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.server.host = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_rejects_empty_paths() {
        let mut config = Config::new();
        config.model.label_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_ignores_missing_model_file() {
        let mut config = Config::new();
        config.model.model_path = PathBuf::from("/nonexistent/model.safetensors");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[model]\nreserved_index = 26\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model.reserved_index, Some(26));
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_config_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[server\nport = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let config = ModelConfig {
            model_path: PathBuf::from("model/m.safetensors"),
            label_path: std::env::temp_dir().join("label.csv"),
            reserved_index: None,
        }
        .resolve_paths(Path::new("/srv/sign"));

        assert_eq!(config.model_path, PathBuf::from("/srv/sign/model/m.safetensors"));
        assert_eq!(config.label_path, std::env::temp_dir().join("label.csv"));
    }

    #[test]
    fn test_resolve_path_keeps_empty_path() {
        let resolved = resolve_path(Path::new(""), Path::new("/srv/sign"));
        assert!(resolved.as_os_str().is_empty());

        let mut config = Config::new();
        config.model = ModelConfig {
            model_path: PathBuf::new(),
            ..ModelConfig::default()
        }
        .resolve_paths(Path::new("/srv/sign"));
        assert!(config.validate().is_err());
    }
}
