//! TST-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Top-level error type for the telemetry store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("[TST-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[TST-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[TST-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[TST-2001] storage unavailable at {path}: {details}")]
    StorageUnavailable { path: PathBuf, details: String },

    #[error("[TST-2002] SQL failure in {context}: {details}")]
    Sql {
        context: &'static str,
        details: String,
    },

    #[error("[TST-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[TST-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[TST-3002] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[TST-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl StoreError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "TST-1001",
            Self::MissingConfig { .. } => "TST-1002",
            Self::ConfigParse { .. } => "TST-1003",
            Self::StorageUnavailable { .. } => "TST-2001",
            Self::Sql { .. } => "TST-2002",
            Self::Serialization { .. } => "TST-2101",
            Self::Io { .. } => "TST-3001",
            Self::ChannelClosed { .. } => "TST-3002",
            Self::Runtime { .. } => "TST-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// `StorageUnavailable` is deliberately non-retryable: a store that
    /// failed to open stays degraded for the process lifetime.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Sql { .. } | Self::Io { .. } | Self::ChannelClosed { .. } | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql {
            context: "rusqlite",
            details: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
