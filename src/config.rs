//! Runtime configuration loaded from an optional TOML file.
//!
//! Every field has a default, so both binaries run with no file present.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Name of the optional configuration file, looked up in the working
/// directory.
pub const CONFIG_FILE_NAME: &str = "burnwatch.toml";

/// Errors that may occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    Parse {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
}

/// Top-level configuration for both binaries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub serve: ServeSettings,
    pub train: TrainSettings,
}

/// Settings for the serving process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeSettings {
    /// Bind address for the HTTP listener.
    pub bind: String,
    /// Path to the model artifact produced by the trainer.
    pub model_path: PathBuf,
}

impl Default for ServeSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            model_path: PathBuf::from("model.json"),
        }
    }
}

/// Settings for the training binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainSettings {
    /// Number of synthetic records to generate.
    pub samples: usize,
    /// Seed for dataset generation, splitting, and fitting.
    pub seed: u64,
    /// Fraction of records held out for evaluation.
    pub test_fraction: f64,
    /// Number of trees in the forest.
    pub trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Where the fitted model is written.
    pub model_out: PathBuf,
}

impl Default for TrainSettings {
    fn default() -> Self {
        Self {
            samples: 2000,
            seed: 42,
            test_fraction: 0.2,
            trees: 100,
            max_depth: 12,
            model_out: PathBuf::from("model.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, returning defaults if the file is
    /// missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
