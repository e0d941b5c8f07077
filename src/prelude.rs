//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use telemetry_store::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, StoreError};

// Records
pub use crate::store::records::{
    EntityKind, Level, LogFilter, LogRecord, PerfSample, ProcessState,
};

// Store
pub use crate::store::executor::StoreExecutor;

// Service
pub use crate::service::{StoreMode, StoreStats, TelemetryStore};

// Tasks
pub use crate::tasks::sweeper::{SweepReport, sweep_once};
