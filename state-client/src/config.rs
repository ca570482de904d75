//! Configuration for the state client.
//!
//! Loaded from a TOML file (conventionally `pitlane.toml`). Every field is
//! optional; missing fields take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Minimum seconds between two resync cycles (default: 10).
    #[serde(default = "default_resync_cooldown_secs")]
    pub resync_cooldown_secs: u64,
    /// Delay in milliseconds between consecutive resync requests
    /// (default: 100). Zero sends the whole batch back to back.
    #[serde(default = "default_request_spacing_ms")]
    pub request_spacing_ms: u64,
    /// Buffered notifications per subscriber before the slowest one starts
    /// lagging (default: 256).
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
    /// Whether the host should subscribe to position batches (default: true).
    #[serde(default = "default_request_position_updates")]
    pub request_position_updates: bool,
}

fn default_resync_cooldown_secs() -> u64 {
    10
}

fn default_request_spacing_ms() -> u64 {
    100
}

fn default_notification_capacity() -> usize {
    256
}

fn default_request_position_updates() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            resync_cooldown_secs: default_resync_cooldown_secs(),
            request_spacing_ms: default_request_spacing_ms(),
            notification_capacity: default_notification_capacity(),
            request_position_updates: default_request_position_updates(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resync cool-down as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.resync_cooldown_secs)
    }

    /// Resync request spacing as a duration.
    pub fn spacing(&self) -> Duration {
        Duration::from_millis(self.request_spacing_ms)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.cooldown(), Duration::from_secs(10));
        assert_eq!(config.spacing(), Duration::from_millis(100));
        assert_eq!(config.notification_capacity, 256);
        assert!(config.request_position_updates);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let toml = r#"
resync_cooldown_secs = 3
request_position_updates = false
"#;
        let config = ClientConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.resync_cooldown_secs, 3);
        assert!(!config.request_position_updates);
        assert_eq!(config.request_spacing_ms, 100);
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        assert!(ClientConfig::from_toml_str("request_spacing_ms = \"fast\"").is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ClientConfig::from_file(Path::new("/nonexistent/pitlane.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("/nonexistent/pitlane.toml"));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pitlane.toml");
        std::fs::write(&path, "request_spacing_ms = 0\n").unwrap();

        let config = ClientConfig::from_file(&path).unwrap();

        assert_eq!(config.spacing(), Duration::ZERO);
        assert_eq!(config.resync_cooldown_secs, 10);
    }

    #[test]
    fn bad_file_is_a_parse_error_naming_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pitlane.toml");
        std::fs::write(&path, "resync_cooldown_secs = -1\n").unwrap();

        let err = ClientConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("pitlane.toml"));
    }
}
