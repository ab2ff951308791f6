//! Configuration management for Prism.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`, and every section may
//! be omitted from the file.

use crate::error::ConfigError;
use image_hasher::HashAlg;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Prism.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identification stage settings
    pub identify: IdentifyConfig,

    /// Perceptual hash settings
    pub hash: HashConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.prism.prism/config.toml
    /// - Linux: ~/.config/prism/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\prism\config\config.toml
    ///
    /// Falls back to ~/.prism/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "prism", "prism")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".prism").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Identification stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifyConfig {
    /// Name of the stage instance, carried on every result for diagnostics
    pub name: String,

    /// Template expanded against a message that offers no richer capability.
    /// Expected to render to either a local file path or Base64 image data;
    /// messages carrying a stream, bytes, or a local path ignore it.
    pub from: String,

    /// Compute the perceptual hash of the image. Hashing is slow next to
    /// decoding, so turn this off if you don't need it.
    pub include_phash: bool,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            name: "identify".to_string(),
            from: "{value}".to_string(),
            include_phash: true,
        }
    }
}

/// Perceptual hash settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Hash algorithm: "mean", "gradient", "vert-gradient", "double-gradient",
    /// or "blockhash"
    pub algorithm: String,

    /// Hash side length in bits (the hash is square)
    pub hash_size: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            algorithm: "double-gradient".to_string(),
            hash_size: 16,
        }
    }
}

impl HashConfig {
    /// Resolve the configured algorithm name.
    pub fn algorithm(&self) -> Result<HashAlg, ConfigError> {
        match self.algorithm.as_str() {
            "mean" => Ok(HashAlg::Mean),
            "gradient" => Ok(HashAlg::Gradient),
            "vert-gradient" => Ok(HashAlg::VertGradient),
            "double-gradient" => Ok(HashAlg::DoubleGradient),
            "blockhash" => Ok(HashAlg::Blockhash),
            other => Err(ConfigError::ValidationError(format!(
                "unknown hash algorithm: {other:?}"
            ))),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "jsonl".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
