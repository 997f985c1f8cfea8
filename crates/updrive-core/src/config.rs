//! Configuration module for updrive.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation and defaults. The loaded `Config` value is
//! passed explicitly into the client, store and engine constructors; nothing
//! reads configuration ambiently.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for updrive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Local directory whose contents are mirrored to the remote folder.
    pub local_dir: PathBuf,
    /// Path of the remote folder that receives the mirror.
    pub remote_dir: String,
    /// Seconds between reconciliation passes.
    pub poll_interval: u64,
}

/// Remote endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the disk resources API.
    pub base_url: String,
    /// Bearer credential for the API. Empty is invalid.
    pub token: String,
}

/// Transport retry settings.
///
/// Applied per remote operation inside the HTTP adapter; the reconciler
/// itself never retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Retry budget per operation, on top of the initial attempt.
    pub retries: u32,
    /// Base delay for exponential backoff, in seconds.
    pub backoff_base_secs: u64,
    /// Upper bound on a single backoff delay, in seconds.
    pub backoff_cap_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Path to the log file. Rotated daily by the appender.
    pub file: PathBuf,
    /// Maximum number of rotated log files to keep.
    pub max_files: u32,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/updrive/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("updrive")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            local_dir: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("backup"),
            remote_dir: "backup".to_string(),
            poll_interval: 60,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cloud-api.yandex.net/v1/disk/resources".to_string(),
            token: String::new(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff_base_secs: 1,
            backoff_cap_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("updrive");
        Self {
            level: "info".to_string(),
            file: data_dir.join("updrive.log"),
            max_files: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.poll_interval"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Sanity ceiling for the per-operation retry budget.
const MAX_RETRIES: u32 = 10;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. Environment
    /// properties (the watched directory existing and being readable) are
    /// checked by the daemon at startup, not here.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        if self.sync.poll_interval == 0 {
            errors.push(ValidationError {
                field: "sync.poll_interval".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.remote_dir.is_empty() {
            errors.push(ValidationError {
                field: "sync.remote_dir".into(),
                message: "must not be empty".into(),
            });
        }

        // --- remote ---
        if self.remote.base_url.is_empty() {
            errors.push(ValidationError {
                field: "remote.base_url".into(),
                message: "must not be empty".into(),
            });
        }
        if self.remote.token.is_empty() {
            errors.push(ValidationError {
                field: "remote.token".into(),
                message: "must not be empty".into(),
            });
        }

        // --- transport ---
        if self.transport.retries > MAX_RETRIES {
            errors.push(ValidationError {
                field: "transport.retries".into(),
                message: format!("must be at most {MAX_RETRIES}"),
            });
        }
        if self.transport.backoff_cap_secs < self.transport.backoff_base_secs {
            errors.push(ValidationError {
                field: "transport.backoff_cap_secs".into(),
                message: "must be at least transport.backoff_base_secs".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!("must be one of {VALID_LOG_LEVELS:?}"),
            });
        }
        if self.logging.max_files == 0 {
            errors.push(ValidationError {
                field: "logging.max_files".into(),
                message: "must be greater than 0".into(),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Startup errors
// ---------------------------------------------------------------------------

/// Fatal configuration problems, detected before the poll loop starts.
///
/// These are the only errors that terminate the process; everything that
/// happens inside a pass is logged and survived.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The watched directory does not exist.
    #[error("watched directory does not exist: {0}")]
    LocalDirMissing(PathBuf),

    /// The watched path exists but is not a directory.
    #[error("watched path is not a directory: {0}")]
    LocalDirNotADirectory(PathBuf),

    /// The watched directory exists but cannot be read.
    #[error("watched directory is not readable: {path}: {source}")]
    LocalDirUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Build an [`ConfigError::Invalid`] from validation errors.
    pub fn from_validation(errors: &[ValidationError]) -> Self {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::Invalid(joined)
    }
}
