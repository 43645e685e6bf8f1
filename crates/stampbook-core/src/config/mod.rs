//! Configuration management for Stampbook.
//!
//! This module handles loading, saving, and managing Stampbook configuration.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/stampbook/config.toml` |
//! | macOS | `~/Library/Application Support/com.stampbook.Stampbook/config.toml` |
//! | Windows | `%APPDATA%\Stampbook\config\config.toml` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use stampbook_core::config::Config;
//!
//! let config = Config::load()?;
//! println!("Lookup timeout: {:?}", config.lookup.timeout);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for Stampbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store settings
    pub store: StoreConfig,
    /// Lookup settings
    pub lookup: LookupConfig,
    /// Display settings
    pub display: DisplayConfig,
    /// QR settings
    pub qr: QrSettings,
    /// Web API settings
    pub web: WebConfig,
}

/// Store configuration options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store file (None = platform data directory)
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// The configured store path, or the platform default.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .or_else(crate::store::JsonStore::default_path)
            .unwrap_or_else(|| PathBuf::from("store.json"))
    }
}

/// Lookup configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Keep a reverse index of codes between lookups
    pub cache: bool,
    /// Minimum directory size before the index is built
    pub cache_threshold: usize,
    /// Upper bound for one verification
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            cache: true,
            cache_threshold: crate::DEFAULT_CACHE_THRESHOLD,
            timeout: Duration::from_secs(crate::DEFAULT_LOOKUP_TIMEOUT_SECS),
        }
    }
}

/// Display configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Name shown for customers without one
    pub placeholder_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            placeholder_name: crate::DEFAULT_DISPLAY_NAME.to_string(),
        }
    }
}

/// QR configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrSettings {
    /// URL scheme for deep links
    pub scheme: String,
}

impl Default for QrSettings {
    fn default() -> Self {
        Self {
            scheme: "stampbook".to_string(),
        }
    }
}

/// Web API configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind to localhost only
    pub localhost_only: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_WEB_PORT,
            localhost_only: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    ///
    /// Creates the configuration directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| Error::ConfigError(format!("Failed to write config: {e}")))
    }

    /// Check values that parse but make no sense.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.lookup.timeout.is_zero() {
            return Err(Error::InvalidConfig {
                key: "lookup.timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.display.placeholder_name.trim().is_empty() {
            return Err(Error::InvalidConfig {
                key: "display.placeholder_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let scheme = &self.qr.scheme;
        let scheme_ok = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !scheme_ok {
            return Err(Error::InvalidConfig {
                key: "qr.scheme".to_string(),
                reason: format!("'{scheme}' is not a valid URL scheme"),
            });
        }

        Ok(())
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stampbook", "Stampbook")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.strip_suffix('s')
            .map(|secs| {
                secs.parse()
                    .map(Duration::from_secs)
                    .map_err(serde::de::Error::custom)
            })
            .or_else(|| {
                s.strip_suffix('m').map(|mins| {
                    mins.parse::<u64>()
                        .map(|m| Duration::from_secs(m * 60))
                        .map_err(serde::de::Error::custom)
                })
            })
            .unwrap_or_else(|| Err(serde::de::Error::custom("invalid duration format")))
    }
}
