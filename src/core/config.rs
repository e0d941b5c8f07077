//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, StoreError};

/// Full telemetry-store configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub batch: BatchConfig,
    pub retention: RetentionConfig,
    pub paths: PathsConfig,
}

/// Batching and flush-scheduling knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BatchConfig {
    /// Queue length at which a kind is flushed immediately.
    pub size: usize,
    /// Period of the timer-driven flush pass.
    pub flush_interval_ms: u64,
    /// Hard per-kind queue bound; oldest items are dropped beyond it.
    pub buffer_capacity: usize,
    /// Whole-batch flush failures tolerated before the batch is dropped.
    pub max_flush_retries: u32,
}

/// Retention sweep horizon and cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetentionConfig {
    /// Maximum row age in days before the sweep removes it.
    pub days: u32,
    /// Period of the sweep pass.
    pub sweep_interval_ms: u64,
}

/// Filesystem paths used by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub db_path: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: 100,
            flush_interval_ms: 5_000,
            buffer_capacity: 10_000,
            max_flush_retries: 2,
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: 30,
            sweep_interval_ms: 86_400_000,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[TSTORE-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("tstore").join("config.toml");
        let data = home_dir.join(".local").join("share").join("tstore");
        Self {
            config_file: cfg,
            db_path: data.join("telemetry.sqlite3"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| StoreError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(StoreError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for logging/telemetry.
    ///
    /// Uses FNV-1a for cross-process-stable hashing (no `DefaultHasher`
    /// whose seed may vary across Rust releases).
    pub fn stable_hash(&self) -> Result<String> {
        stable_json_hash(self)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // batch
        if let Some(raw) = lookup("TSTORE_BATCH_SIZE") {
            self.batch.size = parse_env_usize("TSTORE_BATCH_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("TSTORE_FLUSH_INTERVAL_MS") {
            self.batch.flush_interval_ms = parse_env_u64("TSTORE_FLUSH_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("TSTORE_BUFFER_CAPACITY") {
            self.batch.buffer_capacity = parse_env_usize("TSTORE_BUFFER_CAPACITY", &raw)?;
        }
        if let Some(raw) = lookup("TSTORE_MAX_FLUSH_RETRIES") {
            self.batch.max_flush_retries = parse_env_u32("TSTORE_MAX_FLUSH_RETRIES", &raw)?;
        }

        // retention
        if let Some(raw) = lookup("TSTORE_RETENTION_DAYS") {
            self.retention.days = parse_env_u32("TSTORE_RETENTION_DAYS", &raw)?;
        }
        if let Some(raw) = lookup("TSTORE_SWEEP_INTERVAL_MS") {
            self.retention.sweep_interval_ms = parse_env_u64("TSTORE_SWEEP_INTERVAL_MS", &raw)?;
        }

        // paths
        if let Some(raw) = lookup("TSTORE_DB_PATH") {
            self.paths.db_path = PathBuf::from(raw);
        }

        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.batch.size == 0 {
            return Err(StoreError::InvalidConfig {
                details: "batch.size must be >= 1".to_string(),
            });
        }
        if self.batch.flush_interval_ms == 0 {
            return Err(StoreError::InvalidConfig {
                details: "batch.flush_interval_ms must be > 0".to_string(),
            });
        }
        if self.batch.buffer_capacity < self.batch.size {
            return Err(StoreError::InvalidConfig {
                details: format!(
                    "batch.buffer_capacity ({}) must be >= batch.size ({})",
                    self.batch.buffer_capacity, self.batch.size
                ),
            });
        }
        if self.retention.days == 0 {
            return Err(StoreError::InvalidConfig {
                details: "retention.days must be >= 1".to_string(),
            });
        }
        if self.retention.sweep_interval_ms == 0 {
            return Err(StoreError::InvalidConfig {
                details: "retention.sweep_interval_ms must be > 0".to_string(),
            });
        }
        if self.paths.db_path.as_os_str().is_empty() {
            return Err(StoreError::InvalidConfig {
                details: "paths.db_path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// FNV-1a over the canonical JSON serialization of `value`.
///
/// Identical serialized bodies produce identical hashes; used for config
/// change detection, not security. Shared by `Config::stable_hash` and the
/// `config_history.config_hash` column.
pub fn stable_json_hash<T: Serialize>(value: &T) -> Result<String> {
    let canonical = serde_json::to_string(value)?;
    Ok(fnv1a_hex(canonical.as_bytes()))
}

/// FNV-1a over raw bytes, hex-encoded.
pub(crate) fn fnv1a_hex(bytes: &[u8]) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    format!("{hash:016x}")
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>().map_err(|error| StoreError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_u32(name: &str, raw: &str) -> Result<u32> {
    raw.parse::<u32>().map_err(|error| StoreError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>()
        .map_err(|error| StoreError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
