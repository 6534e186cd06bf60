//! Keychain configuration.
//!
//! Resolution order, later wins:
//! 1. Built-in defaults
//! 2. JSON file (`<config_dir>/keychain-helper/config.json` by default)
//! 3. `KEYCHAIN_HELPER_*` environment variables

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::KeychainError;

const CONFIG_DIR: &str = "keychain-helper";
const CONFIG_FILE: &str = "config.json";

pub const ENV_SERVICE: &str = "KEYCHAIN_HELPER_SERVICE";
pub const ENV_VENDOR_ID_LABEL: &str = "KEYCHAIN_HELPER_VENDOR_ID_LABEL";
pub const ENV_CREDENTIAL_LABEL: &str = "KEYCHAIN_HELPER_CREDENTIAL_LABEL";

/// Names under which the two records live in the keychain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeychainConfig {
    /// Keychain service name every entry is filed under.
    pub service: String,
    /// Label of the vendor identifier record.
    pub vendor_id_label: String,
    /// Label of the username/password record.
    pub credential_label: String,
}

impl Default for KeychainConfig {
    fn default() -> Self {
        Self {
            service: "keychain-helper".to_string(),
            vendor_id_label: "IDFV".to_string(),
            credential_label: "Username&Password".to_string(),
        }
    }
}

impl KeychainConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Read a configuration file. Fields the file leaves out keep their
    /// defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Defaults, then `path` (or the default location) if the file exists,
    /// then the process environment. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load), with overrides read through `lookup`
    /// instead of the process environment.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.map_or_else(Self::default_path, Path::to_path_buf);
        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        let config = config.with_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Apply `KEYCHAIN_HELPER_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(service) = lookup(ENV_SERVICE) {
            self.service = service;
        }
        if let Some(label) = lookup(ENV_VENDOR_ID_LABEL) {
            self.vendor_id_label = label;
        }
        if let Some(label) = lookup(ENV_CREDENTIAL_LABEL) {
            self.credential_label = label;
        }
        self
    }

    /// Both labels must be set and must not collide, otherwise the two
    /// records would overwrite each other.
    pub fn validate(&self) -> std::result::Result<(), KeychainError> {
        for (name, value) in [
            ("service", &self.service),
            ("vendor_id_label", &self.vendor_id_label),
            ("credential_label", &self.credential_label),
        ] {
            if value.trim().is_empty() {
                return Err(KeychainError::Config(format!("{name} must not be empty")));
            }
        }
        if self.vendor_id_label == self.credential_label {
            return Err(KeychainError::Config(format!(
                "vendor_id_label and credential_label are both '{}'",
                self.vendor_id_label
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_labels() {
        let config = KeychainConfig::default();
        assert_eq!(config.vendor_id_label, "IDFV");
        assert_eq!(config.credential_label, "Username&Password");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_replace_only_what_is_set() {
        let config = KeychainConfig::default().with_overrides(|key| match key {
            ENV_SERVICE => Some("my-app".to_string()),
            _ => None,
        });
        assert_eq!(config.service, "my-app");
        assert_eq!(config.vendor_id_label, "IDFV");
    }

    #[test]
    fn colliding_labels_are_rejected() {
        let config = KeychainConfig {
            credential_label: "IDFV".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KeychainError::Config(_))));
    }

    #[test]
    fn blank_service_is_rejected() {
        let config = KeychainConfig {
            service: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_path_ends_with_config_file() {
        let path = KeychainConfig::default_path();
        assert!(path.ends_with("keychain-helper/config.json"));
    }
}
