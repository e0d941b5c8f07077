//! Facade: the single entry point the rest of an application records
//! telemetry through.
//!
//! Construction never fails. If the durable layer cannot be opened the
//! store runs **degraded**: every `save_*` call still succeeds (items land
//! in the bounded in-memory buffers and are never persisted) and every
//! `get_*` call returns empty results. Durability is best-effort in both
//! modes — writes are buffered and flushed in batches, and a batch that
//! exhausts its flush retries is dropped with an error log. Subsystems
//! needing compliance-grade audit must not rely on this store alone.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::buffer::BatchBuffer;
use crate::core::config::Config;
use crate::core::errors::{Result, StoreError};
use crate::store::executor::StoreExecutor;
use crate::store::records::{
    ConfigHistoryRow, ConfigRecord, EntityKind, format_ts, HealthMetricRecord, HealthMetricRow,
    Level, LogEntryRow, LogFilter, LogRecord, now_ts, parse_json_column, PerfSample,
    PerformanceMetricRecord, PerformanceMetricRow, ProcessState, ProcessStatusRecord,
    ProcessStatusRow, Record, SystemEventRecord, SystemEventRow,
};
use crate::tasks::{PeriodicTask, flush, sweeper};

/// Operating mode, fixed at construction for the process lifetime.
///
/// There is no automatic recovery from `Degraded` to `Ready`; restart the
/// process once storage is back. (The transient uninitialized/initializing
/// states exist only inside [`TelemetryStore::open`].)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Durable layer available; buffered writes are flushed to it.
    Ready,
    /// Durable layer unavailable; buffer-only operation.
    Degraded,
}

/// Row counts and size snapshot for diagnostics.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// (table, row count) per table; empty in degraded mode.
    pub rows_per_table: Vec<(&'static str, i64)>,
    /// Database file size in bytes; 0 in degraded mode.
    pub database_size_bytes: i64,
    /// Items currently buffered across all kinds.
    pub buffered: usize,
    /// Items dropped by the buffer overflow policy since construction.
    pub dropped: u64,
}

/// Shared internals: the only owners of the buffers and the connection.
pub(crate) struct StoreCore {
    pub(crate) executor: Option<StoreExecutor>,
    pub(crate) buffer: BatchBuffer,
    pub(crate) config: Config,
    /// Serializes drain-and-insert per kind so concurrent flushers (timer
    /// tick vs size trigger) cannot reorder batches within a kind.
    pub(crate) flush_locks: [parking_lot::Mutex<()>; 6],
}

/// The telemetry store facade. See the module docs for the durability
/// contract.
pub struct TelemetryStore {
    core: Arc<StoreCore>,
    flush_task: Option<PeriodicTask>,
    sweep_task: Option<PeriodicTask>,
}

impl TelemetryStore {
    /// Open the store. Never fails: storage problems put the instance in
    /// [`StoreMode::Degraded`] instead.
    ///
    /// The flush scheduler and retention sweeper are spawned only in
    /// `Ready` mode — degraded instances have nothing to flush into.
    #[must_use]
    pub fn open(config: Config) -> Self {
        let executor = match StoreExecutor::open(&config.paths.db_path) {
            Ok(executor) => Some(executor),
            Err(error) => {
                eprintln!("[TSTORE-STORE] WARNING: running buffer-only: {error}");
                None
            }
        };
        let buffer = BatchBuffer::new(config.batch.size, config.batch.buffer_capacity);
        let core = Arc::new(StoreCore {
            executor,
            buffer,
            config,
            flush_locks: std::array::from_fn(|_| parking_lot::Mutex::new(())),
        });

        let (flush_task, sweep_task) = if core.executor.is_some() {
            let flush_period = Duration::from_millis(core.config.batch.flush_interval_ms);
            let sweep_period = Duration::from_millis(core.config.retention.sweep_interval_ms);
            (
                spawn_or_warn(flush::spawn(Arc::clone(&core), flush_period)),
                spawn_or_warn(sweeper::spawn(Arc::clone(&core), sweep_period)),
            )
        } else {
            (None, None)
        };

        Self {
            core,
            flush_task,
            sweep_task,
        }
    }

    /// Current operating mode.
    #[must_use]
    pub fn mode(&self) -> StoreMode {
        if self.core.executor.is_some() {
            StoreMode::Ready
        } else {
            StoreMode::Degraded
        }
    }

    /// Whether the durable layer is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.mode() == StoreMode::Ready
    }

    /// Effective configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.core.config
    }

    // ──────────────────── write surface ────────────────────

    /// Record one log event.
    pub fn save_log_entry(&self, record: LogRecord) {
        self.enqueue(Record::Log(record));
    }

    /// Record one status transition for a named logical process. Always a
    /// new row (append-only history). `start_time`/`stop_time` are stamped
    /// from the recorded state.
    pub fn save_process_status(
        &self,
        process_type: &str,
        state: ProcessState,
        pid: Option<i64>,
        config: Option<&Value>,
        error_message: Option<&str>,
    ) {
        let now = now_ts();
        self.enqueue(Record::Status(ProcessStatusRecord {
            process_type: process_type.to_string(),
            pid,
            state,
            start_time: (state == ProcessState::Running).then(|| now.clone()),
            stop_time: (state == ProcessState::Stopped).then(|| now.clone()),
            config: config.map(Value::to_string),
            error_message: error_message.map(str::to_string),
        }));
    }

    /// Record a set of named health samples under one shared timestamp,
    /// one row per metric.
    pub fn save_health_metrics(&self, process_type: &str, metrics: &[(&str, f64)]) {
        let timestamp = now_ts();
        for (name, value) in metrics {
            self.enqueue(Record::Health(HealthMetricRecord {
                process_type: process_type.to_string(),
                metric_name: (*name).to_string(),
                metric_value: *value,
                timestamp: timestamp.clone(),
            }));
        }
    }

    /// Record a set of performance samples under one shared timestamp.
    pub fn save_performance_metrics(&self, process_type: &str, metrics: &[(&str, PerfSample)]) {
        let timestamp = now_ts();
        for (metric_type, sample) in metrics {
            self.enqueue(Record::Perf(PerformanceMetricRecord {
                process_type: process_type.to_string(),
                metric_type: (*metric_type).to_string(),
                value: sample.value,
                unit: sample.unit.clone(),
                timestamp: timestamp.clone(),
                metadata: sample.metadata.clone(),
            }));
        }
    }

    /// Record one generic structured event, stamped with the current time.
    pub fn save_system_event(
        &self,
        event_type: &str,
        event_data: Option<Value>,
        severity: Level,
        source: Option<&str>,
    ) {
        self.enqueue(Record::Event(SystemEventRecord {
            event_type: event_type.to_string(),
            event_data,
            severity,
            source: source.map(str::to_string),
            timestamp: now_ts(),
        }));
    }

    /// Record a configuration change. The body is hashed (content-addressed
    /// change detection, not security) over its canonical serialization.
    /// A body that fails to serialize is dropped with a logged warning.
    pub fn save_configuration<C: Serialize>(
        &self,
        process_type: &str,
        config: &C,
        user_id: Option<&str>,
        change_reason: Option<&str>,
    ) {
        let config_data = match serde_json::to_string(config) {
            Ok(serialized) => serialized,
            Err(error) => {
                let error = StoreError::from(error);
                eprintln!("[TSTORE-STORE] WARNING: config snapshot for {process_type} dropped: {error}");
                return;
            }
        };
        let config_hash = crate::core::config::fnv1a_hex(config_data.as_bytes());
        self.enqueue(Record::Config(ConfigRecord {
            process_type: process_type.to_string(),
            config_data,
            config_hash,
            user_id: user_id.map(str::to_string),
            change_reason: change_reason.map(str::to_string),
        }));
    }

    // ──────────────────── read surface ────────────────────

    /// Log entries matching `filter`, newest first. Empty in degraded mode
    /// or on a read failure (logged); callers treat empty as "no data".
    #[must_use]
    pub fn get_log_entries(
        &self,
        filter: &LogFilter,
        limit: usize,
        offset: usize,
    ) -> Vec<LogEntryRow> {
        let Some(executor) = self.core.executor.as_ref() else {
            return Vec::new();
        };

        let mut sql = String::from(
            "SELECT id, timestamp, source, level, component, message, layer,
                    message_type, rnti, ue_id, fields, raw_data, created_at
             FROM log_entries WHERE 1=1",
        );
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(source) = &filter.source {
            sql.push_str(" AND source = ?");
            params.push(source.clone().into());
        }
        if let Some(level) = filter.level {
            sql.push_str(" AND level = ?");
            params.push(level.as_str().to_string().into());
        }
        if let Some(component) = &filter.component {
            sql.push_str(" AND component = ?");
            params.push(component.clone().into());
        }
        if let Some(start) = filter.start_time {
            sql.push_str(" AND timestamp >= ?");
            params.push(format_ts(start).into());
        }
        if let Some(end) = filter.end_time {
            sql.push_str(" AND timestamp <= ?");
            params.push(format_ts(end).into());
        }
        sql.push_str(" ORDER BY timestamp DESC LIMIT ? OFFSET ?");
        params.push(i64::try_from(limit).unwrap_or(i64::MAX).into());
        params.push(i64::try_from(offset).unwrap_or(0).into());

        read_or_empty(|| {
            executor.query_all(&sql, rusqlite::params_from_iter(params.iter()), |row| {
                Ok(LogEntryRow {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    source: row.get(2)?,
                    level: row.get(3)?,
                    component: row.get(4)?,
                    message: row.get(5)?,
                    layer: row.get(6)?,
                    message_type: row.get(7)?,
                    rnti: row.get(8)?,
                    ue_id: row.get(9)?,
                    fields: parse_json_column(row.get(10)?),
                    raw_data: row.get(11)?,
                    created_at: row.get(12)?,
                })
            })
        })
    }

    /// Status-transition history for a process, newest first.
    #[must_use]
    pub fn get_process_status_history(
        &self,
        process_type: &str,
        limit: usize,
    ) -> Vec<ProcessStatusRow> {
        let Some(executor) = self.core.executor.as_ref() else {
            return Vec::new();
        };
        read_or_empty(|| {
            executor.query_all(
                "SELECT id, process_type, pid, status, start_time, stop_time,
                        config, error_message, created_at
                 FROM process_status WHERE process_type = ?1
                 ORDER BY id DESC LIMIT ?2",
                rusqlite::params![process_type, i64::try_from(limit).unwrap_or(i64::MAX)],
                |row| {
                    Ok(ProcessStatusRow {
                        id: row.get(0)?,
                        process_type: row.get(1)?,
                        pid: row.get(2)?,
                        status: row.get(3)?,
                        start_time: row.get(4)?,
                        stop_time: row.get(5)?,
                        config: parse_json_column(row.get(6)?),
                        error_message: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                },
            )
        })
    }

    /// Health samples for a process in a time window, oldest first.
    #[must_use]
    pub fn get_health_metrics(
        &self,
        process_type: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<HealthMetricRow> {
        let Some(executor) = self.core.executor.as_ref() else {
            return Vec::new();
        };
        read_or_empty(|| {
            executor.query_all(
                "SELECT id, process_type, metric_name, metric_value, timestamp, created_at
                 FROM health_metrics
                 WHERE process_type = ?1 AND timestamp BETWEEN ?2 AND ?3
                 ORDER BY timestamp ASC",
                rusqlite::params![process_type, format_ts(start), format_ts(end)],
                |row| {
                    Ok(HealthMetricRow {
                        id: row.get(0)?,
                        process_type: row.get(1)?,
                        metric_name: row.get(2)?,
                        metric_value: row.get(3)?,
                        timestamp: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
        })
    }

    /// Performance samples of one type for a process in a time window,
    /// oldest first.
    #[must_use]
    pub fn get_performance_metrics(
        &self,
        process_type: &str,
        metric_type: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<PerformanceMetricRow> {
        let Some(executor) = self.core.executor.as_ref() else {
            return Vec::new();
        };
        read_or_empty(|| {
            executor.query_all(
                "SELECT id, process_type, metric_type, value, unit, timestamp, metadata, created_at
                 FROM performance_metrics
                 WHERE process_type = ?1 AND metric_type = ?2 AND timestamp BETWEEN ?3 AND ?4
                 ORDER BY timestamp ASC",
                rusqlite::params![process_type, metric_type, format_ts(start), format_ts(end)],
                |row| {
                    Ok(PerformanceMetricRow {
                        id: row.get(0)?,
                        process_type: row.get(1)?,
                        metric_type: row.get(2)?,
                        value: row.get(3)?,
                        unit: row.get(4)?,
                        timestamp: row.get(5)?,
                        metadata: parse_json_column(row.get(6)?),
                        created_at: row.get(7)?,
                    })
                },
            )
        })
    }

    /// Config-change audit trail for a process, newest first.
    #[must_use]
    pub fn get_configuration_history(
        &self,
        process_type: &str,
        limit: usize,
    ) -> Vec<ConfigHistoryRow> {
        let Some(executor) = self.core.executor.as_ref() else {
            return Vec::new();
        };
        read_or_empty(|| {
            executor.query_all(
                "SELECT id, process_type, config_data, config_hash, user_id,
                        change_reason, created_at
                 FROM config_history WHERE process_type = ?1
                 ORDER BY id DESC LIMIT ?2",
                rusqlite::params![process_type, i64::try_from(limit).unwrap_or(i64::MAX)],
                |row| {
                    Ok(ConfigHistoryRow {
                        id: row.get(0)?,
                        process_type: row.get(1)?,
                        config_data: parse_json_column(row.get(2)?),
                        config_hash: row.get(3)?,
                        user_id: row.get(4)?,
                        change_reason: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                },
            )
        })
    }

    /// Recent system events, newest first.
    #[must_use]
    pub fn get_system_events(&self, limit: usize) -> Vec<SystemEventRow> {
        let Some(executor) = self.core.executor.as_ref() else {
            return Vec::new();
        };
        read_or_empty(|| {
            executor.query_all(
                "SELECT id, event_type, event_data, severity, source, timestamp, created_at
                 FROM system_events ORDER BY id DESC LIMIT ?1",
                rusqlite::params![i64::try_from(limit).unwrap_or(i64::MAX)],
                |row| {
                    Ok(SystemEventRow {
                        id: row.get(0)?,
                        event_type: row.get(1)?,
                        event_data: parse_json_column(row.get(2)?),
                        severity: row.get(3)?,
                        source: row.get(4)?,
                        timestamp: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                },
            )
        })
    }

    /// Row counts, database size, and buffer pressure for diagnostics.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let buffered = self.core.buffer.total_len();
        let dropped = self.core.buffer.dropped();
        let Some(executor) = self.core.executor.as_ref() else {
            return StoreStats {
                rows_per_table: Vec::new(),
                database_size_bytes: 0,
                buffered,
                dropped,
            };
        };

        let mut rows_per_table = Vec::new();
        for kind in EntityKind::ALL {
            let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
            match executor.query_one(&sql, [], |row| row.get(0)) {
                Ok(Some(count)) => rows_per_table.push((kind.table(), count)),
                Ok(None) => {}
                Err(error) => {
                    eprintln!("[TSTORE-STORE] stats read failed for {kind}: {error}");
                }
            }
        }
        let database_size_bytes = executor
            .query_one(
                "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
                [],
                |row| row.get(0),
            )
            .ok()
            .flatten()
            .unwrap_or(0);

        StoreStats {
            rows_per_table,
            database_size_bytes,
            buffered,
            dropped,
        }
    }

    // ──────────────────── lifecycle ────────────────────

    /// Drain every buffered kind into the store now. No-op in degraded mode.
    pub fn flush_all(&self) {
        flush::flush_pass(&self.core);
    }

    /// Orderly shutdown: stop both periodic tasks, drain the buffers once
    /// more, then release the connection.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(task) = self.flush_task.take() {
            task.stop();
        }
        if let Some(task) = self.sweep_task.take() {
            task.stop();
        }
        flush::flush_pass(&self.core);
    }

    fn enqueue(&self, record: Record) {
        let kind = record.kind();
        self.core.buffer.enqueue(record);
        // Size-triggered flush; the timer covers the slow-trickle case.
        if self.core.executor.is_some() && self.core.buffer.should_flush(kind) {
            flush::flush_kind(&self.core, kind);
        }
    }

}

impl Drop for TelemetryStore {
    fn drop(&mut self) {
        // Covers error exits and callers that never reached close().
        self.shutdown();
    }
}

/// Read-path recovery: failures are logged and collapse to "no data"
/// (dashboards keep rendering with reduced observability).
fn read_or_empty<T>(query: impl FnOnce() -> Result<Vec<T>>) -> Vec<T> {
    query().unwrap_or_else(|error| {
        eprintln!("[TSTORE-STORE] read failed, returning empty: {error}");
        Vec::new()
    })
}

fn spawn_or_warn(spawned: Result<PeriodicTask>) -> Option<PeriodicTask> {
    match spawned {
        Ok(task) => Some(task),
        Err(error) => {
            eprintln!("[TSTORE-STORE] WARNING: background task unavailable: {error}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.paths.db_path = dir.join("telemetry.sqlite3");
        // Keep the timer out of the way; tests trigger flushes explicitly.
        config.batch.flush_interval_ms = 3_600_000;
        config.retention.sweep_interval_ms = 3_600_000;
        config
    }

    #[test]
    fn open_ready_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TelemetryStore::open(test_config(dir.path()));
        assert_eq!(store.mode(), StoreMode::Ready);
        assert!(store.is_available());

        for i in 0..3 {
            store.save_log_entry(LogRecord::new("enb", Level::Info, format!("msg-{i}")));
        }
        store.flush_all();

        let rows = store.get_log_entries(&LogFilter::default(), 100, 0);
        assert_eq!(rows.len(), 3);
        store.close();
    }

    #[test]
    fn size_threshold_triggers_immediate_flush() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.batch.size = 5;
        let store = TelemetryStore::open(config);

        for i in 0..5 {
            store.save_log_entry(LogRecord::new("ue", Level::Debug, format!("m{i}")));
        }
        // No explicit flush: the fifth enqueue crossed the threshold.
        let rows = store.get_log_entries(&LogFilter::default(), 100, 0);
        assert_eq!(rows.len(), 5);
        store.close();
    }

    #[test]
    fn process_status_stamps_transition_times() {
        let dir = tempfile::tempdir().unwrap();
        let store = TelemetryStore::open(test_config(dir.path()));

        store.save_process_status("enb", ProcessState::Running, Some(4321), None, None);
        store.save_process_status("enb", ProcessState::Stopped, Some(4321), None, None);
        store.flush_all();

        let history = store.get_process_status_history("enb", 10);
        assert_eq!(history.len(), 2);
        // Newest first.
        assert_eq!(history[0].status, "stopped");
        assert!(history[0].stop_time.is_some());
        assert!(history[0].start_time.is_none());
        assert_eq!(history[1].status, "running");
        assert!(history[1].start_time.is_some());
        assert!(history[1].stop_time.is_none());
        store.close();
    }

    #[test]
    fn health_metrics_fan_out_under_one_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = TelemetryStore::open(test_config(dir.path()));

        store.save_health_metrics("mme", &[("cpu_pct", 12.5), ("mem_mb", 512.0)]);
        store.flush_all();

        let window_start = Utc::now() - chrono::Duration::minutes(1);
        let window_end = Utc::now() + chrono::Duration::minutes(1);
        let rows = store.get_health_metrics("mme", window_start, window_end);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, rows[1].timestamp);
        store.close();
    }

    #[test]
    fn configuration_history_is_hashed_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let store = TelemetryStore::open(test_config(dir.path()));

        let first = json!({"bandwidth_mhz": 20});
        let second = json!({"bandwidth_mhz": 40});
        store.save_configuration("enb", &first, Some("operator"), Some("bringup"));
        store.save_configuration("enb", &second, Some("operator"), Some("widen"));
        store.save_configuration("enb", &second, None, None);
        store.flush_all();

        let history = store.get_configuration_history("enb", 10);
        assert_eq!(history.len(), 3);
        // Identical bodies, identical hashes; different bodies differ.
        assert_eq!(history[0].config_hash, history[1].config_hash);
        assert_ne!(history[1].config_hash, history[2].config_hash);
        assert_eq!(history[0].config_data, Some(second));
        store.close();
    }

    #[test]
    fn log_filters_compose() {
        let dir = tempfile::tempdir().unwrap();
        let store = TelemetryStore::open(test_config(dir.path()));

        store.save_log_entry(LogRecord::new("enb", Level::Error, "bad"));
        store.save_log_entry(LogRecord::new("enb", Level::Info, "fine"));
        store.save_log_entry(LogRecord::new("mme", Level::Error, "worse"));
        store.flush_all();

        let filter = LogFilter {
            source: Some("enb".to_string()),
            level: Some(Level::Error),
            ..LogFilter::default()
        };
        let rows = store.get_log_entries(&filter, 100, 0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message, "bad");
        store.close();
    }

    #[test]
    fn degraded_mode_never_throws_and_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let mut config = test_config(dir.path());
        config.paths.db_path = blocker.join("sub").join("telemetry.sqlite3");

        let store = TelemetryStore::open(config);
        assert_eq!(store.mode(), StoreMode::Degraded);
        assert!(!store.is_available());

        store.save_log_entry(LogRecord::new("enb", Level::Info, "buffered only"));
        store.save_system_event("cell_up", None, Level::Info, None);
        store.save_health_metrics("enb", &[("cpu_pct", 1.0)]);
        store.flush_all();

        assert!(store.get_log_entries(&LogFilter::default(), 100, 0).is_empty());
        assert!(store.get_system_events(10).is_empty());
        let stats = store.stats();
        assert!(stats.rows_per_table.is_empty());
        assert_eq!(stats.database_size_bytes, 0);
        assert_eq!(stats.buffered, 3);
        store.close();
    }

    #[test]
    fn close_drains_buffered_items() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let db_path = config.paths.db_path.clone();
        let store = TelemetryStore::open(config);

        store.save_log_entry(LogRecord::new("enb", Level::Warn, "pending"));
        store.close();

        let executor = StoreExecutor::open(&db_path).unwrap();
        let count: i64 = executor
            .query_one("SELECT COUNT(*) FROM log_entries", [], |row| row.get(0))
            .unwrap()
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn stats_reports_rows_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = TelemetryStore::open(test_config(dir.path()));

        store.save_log_entry(LogRecord::new("enb", Level::Info, "one"));
        store.save_system_event("cell_up", Some(json!({"cell": 1})), Level::Info, Some("enb"));
        store.flush_all();

        let stats = store.stats();
        let by_table: std::collections::HashMap<_, _> =
            stats.rows_per_table.iter().copied().collect();
        assert_eq!(by_table["log_entries"], 1);
        assert_eq!(by_table["system_events"], 1);
        assert_eq!(by_table["config_history"], 0);
        assert!(stats.database_size_bytes > 0);
        assert_eq!(stats.buffered, 0);
        store.close();
    }
}
