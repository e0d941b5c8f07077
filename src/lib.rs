#![forbid(unsafe_code)]

//! Telemetry Store (tstore) — embedded, file-backed persistence for
//! high-frequency log/metric/event writes from protocol-simulation
//! workloads.
//!
//! Writes are buffered in memory per entity kind, flushed to SQLite in
//! batches (on a size threshold or a periodic timer), and aged out by a
//! retention sweeper. If the database cannot be opened the store degrades
//! to buffer-only operation instead of failing its callers.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use telemetry_store::prelude::*;
//!
//! let store = TelemetryStore::open(Config::default());
//! store.save_log_entry(LogRecord::new("enb", Level::Info, "cell 7 up"));
//! store.close();
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use telemetry_store::core::config::Config;
//! use telemetry_store::service::TelemetryStore;
//! ```

pub mod prelude;

mod buffer;
#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod service;
pub mod store;
pub mod tasks;
