//! Entity kinds and record types for the six telemetry tables.
//!
//! Input records carry typed timestamps and structured payloads; JSON-bearing
//! fields are serialized at insert time. Read-side rows return stored column
//! values as-is (enums are enforced at the write boundary).

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical timestamp format: RFC 3339 UTC with millisecond precision.
///
/// Uniform width keeps lexicographic `timestamp < cutoff` comparisons
/// correct in SQL.
#[must_use]
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current UTC time in the canonical column format.
#[must_use]
pub fn now_ts() -> String {
    format_ts(Utc::now())
}

// ──────────────────── entity kinds ────────────────────

/// The six record types managed by the store, one table each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    LogEntry,
    ProcessStatus,
    HealthMetric,
    ConfigHistory,
    SystemEvent,
    PerformanceMetric,
}

impl EntityKind {
    /// All kinds, in table order.
    pub const ALL: [Self; 6] = [
        Self::LogEntry,
        Self::ProcessStatus,
        Self::HealthMetric,
        Self::ConfigHistory,
        Self::SystemEvent,
        Self::PerformanceMetric,
    ];

    /// Backing table name.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::LogEntry => "log_entries",
            Self::ProcessStatus => "process_status",
            Self::HealthMetric => "health_metrics",
            Self::ConfigHistory => "config_history",
            Self::SystemEvent => "system_events",
            Self::PerformanceMetric => "performance_metrics",
        }
    }

    /// Stable index for per-kind queue storage.
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::LogEntry => 0,
            Self::ProcessStatus => 1,
            Self::HealthMetric => 2,
            Self::ConfigHistory => 3,
            Self::SystemEvent => 4,
            Self::PerformanceMetric => 5,
        }
    }

    /// Whether the retention sweep applies to this kind.
    ///
    /// `process_status` and `config_history` are audit trails and are
    /// never swept.
    #[must_use]
    pub const fn swept_by_retention(self) -> bool {
        matches!(
            self,
            Self::LogEntry | Self::HealthMetric | Self::SystemEvent | Self::PerformanceMetric
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

// ──────────────────── closed enums ────────────────────

/// Severity level for log entries and system events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl Level {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state recorded in `process_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Starting,
    Running,
    Stopped,
    Error,
}

impl ProcessState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ──────────────────── input records ────────────────────

/// A single log event, as produced by upstream subsystems.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Event time (distinct from the ingestion-time `created_at` column).
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub level: Level,
    pub component: Option<String>,
    pub message: String,
    /// Protocol-layer tag (e.g. "rrc", "nas").
    pub layer: Option<String>,
    pub message_type: Option<String>,
    /// Session/identity correlation keys.
    pub rnti: Option<String>,
    pub ue_id: Option<String>,
    /// Structured payload, serialized as JSON on insert.
    pub fields: Option<Value>,
    /// Raw/original payload, stored opaquely.
    pub raw_data: Option<String>,
}

impl LogRecord {
    /// New record stamped with the current UTC time.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        level: Level,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            source: source.into(),
            level,
            component: None,
            message: message.into(),
            layer: None,
            message_type: None,
            rnti: None,
            ue_id: None,
            fields: None,
            raw_data: None,
        }
    }
}

/// One status transition for a named logical process. Append-only history.
#[derive(Debug, Clone)]
pub struct ProcessStatusRecord {
    pub process_type: String,
    pub pid: Option<i64>,
    pub state: ProcessState,
    pub start_time: Option<String>,
    pub stop_time: Option<String>,
    /// Config snapshot, already serialized.
    pub config: Option<String>,
    pub error_message: Option<String>,
}

/// One named numeric health sample.
#[derive(Debug, Clone)]
pub struct HealthMetricRecord {
    pub process_type: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub timestamp: String,
}

/// One config-history audit row. `config_data` is the canonical serialized
/// body that `config_hash` was computed over.
#[derive(Debug, Clone)]
pub struct ConfigRecord {
    pub process_type: String,
    pub config_data: String,
    pub config_hash: String,
    pub user_id: Option<String>,
    pub change_reason: Option<String>,
}

/// One generic structured event, not tied to a specific process.
#[derive(Debug, Clone)]
pub struct SystemEventRecord {
    pub event_type: String,
    pub event_data: Option<Value>,
    pub severity: Level,
    pub source: Option<String>,
    pub timestamp: String,
}

/// One performance sample with unit and free-form metadata.
#[derive(Debug, Clone)]
pub struct PerformanceMetricRecord {
    pub process_type: String,
    pub metric_type: String,
    pub value: f64,
    pub unit: Option<String>,
    pub timestamp: String,
    pub metadata: Option<Value>,
}

/// Value type for [`crate::service::TelemetryStore::save_performance_metrics`]:
/// a sample with optional unit and metadata.
#[derive(Debug, Clone)]
pub struct PerfSample {
    pub value: f64,
    pub unit: Option<String>,
    pub metadata: Option<Value>,
}

// ──────────────────── buffered record ────────────────────

/// A buffered write, tagged by entity kind.
#[derive(Debug, Clone)]
pub(crate) enum Record {
    Log(LogRecord),
    Status(ProcessStatusRecord),
    Health(HealthMetricRecord),
    Config(ConfigRecord),
    Event(SystemEventRecord),
    Perf(PerformanceMetricRecord),
}

impl Record {
    pub(crate) const fn kind(&self) -> EntityKind {
        match self {
            Self::Log(_) => EntityKind::LogEntry,
            Self::Status(_) => EntityKind::ProcessStatus,
            Self::Health(_) => EntityKind::HealthMetric,
            Self::Config(_) => EntityKind::ConfigHistory,
            Self::Event(_) => EntityKind::SystemEvent,
            Self::Perf(_) => EntityKind::PerformanceMetric,
        }
    }

    /// Insert this record via a cached prepared statement.
    pub(crate) fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
        match self {
            Self::Log(r) => {
                conn.prepare_cached(
                    "INSERT INTO log_entries (
                        timestamp, source, level, component, message, layer,
                        message_type, rnti, ue_id, fields, raw_data
                    ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
                )?
                .execute(params![
                    format_ts(r.timestamp),
                    r.source,
                    r.level.as_str(),
                    r.component,
                    r.message,
                    r.layer,
                    r.message_type,
                    r.rnti,
                    r.ue_id,
                    r.fields.as_ref().map(Value::to_string),
                    r.raw_data,
                ])?;
            }
            Self::Status(r) => {
                conn.prepare_cached(
                    "INSERT INTO process_status (
                        process_type, pid, status, start_time, stop_time,
                        config, error_message
                    ) VALUES (?1,?2,?3,?4,?5,?6,?7)",
                )?
                .execute(params![
                    r.process_type,
                    r.pid,
                    r.state.as_str(),
                    r.start_time,
                    r.stop_time,
                    r.config,
                    r.error_message,
                ])?;
            }
            Self::Health(r) => {
                conn.prepare_cached(
                    "INSERT INTO health_metrics (
                        process_type, metric_name, metric_value, timestamp
                    ) VALUES (?1,?2,?3,?4)",
                )?
                .execute(params![
                    r.process_type,
                    r.metric_name,
                    r.metric_value,
                    r.timestamp,
                ])?;
            }
            Self::Config(r) => {
                conn.prepare_cached(
                    "INSERT INTO config_history (
                        process_type, config_data, config_hash, user_id, change_reason
                    ) VALUES (?1,?2,?3,?4,?5)",
                )?
                .execute(params![
                    r.process_type,
                    r.config_data,
                    r.config_hash,
                    r.user_id,
                    r.change_reason,
                ])?;
            }
            Self::Event(r) => {
                conn.prepare_cached(
                    "INSERT INTO system_events (
                        event_type, event_data, severity, source, timestamp
                    ) VALUES (?1,?2,?3,?4,?5)",
                )?
                .execute(params![
                    r.event_type,
                    r.event_data.as_ref().map(Value::to_string),
                    r.severity.as_str(),
                    r.source,
                    r.timestamp,
                ])?;
            }
            Self::Perf(r) => {
                conn.prepare_cached(
                    "INSERT INTO performance_metrics (
                        process_type, metric_type, value, unit, timestamp, metadata
                    ) VALUES (?1,?2,?3,?4,?5,?6)",
                )?
                .execute(params![
                    r.process_type,
                    r.metric_type,
                    r.value,
                    r.unit,
                    r.timestamp,
                    r.metadata.as_ref().map(Value::to_string),
                ])?;
            }
        }
        Ok(())
    }
}

// ──────────────────── read-side rows ────────────────────

/// Row from `log_entries`. `fields` is parsed back from JSON leniently;
/// unparseable payloads come back as `None`.
#[derive(Debug, Clone)]
pub struct LogEntryRow {
    pub id: i64,
    pub timestamp: String,
    pub source: String,
    pub level: String,
    pub component: Option<String>,
    pub message: String,
    pub layer: Option<String>,
    pub message_type: Option<String>,
    pub rnti: Option<String>,
    pub ue_id: Option<String>,
    pub fields: Option<Value>,
    pub raw_data: Option<String>,
    pub created_at: String,
}

/// Row from `process_status`.
#[derive(Debug, Clone)]
pub struct ProcessStatusRow {
    pub id: i64,
    pub process_type: String,
    pub pid: Option<i64>,
    pub status: String,
    pub start_time: Option<String>,
    pub stop_time: Option<String>,
    pub config: Option<Value>,
    pub error_message: Option<String>,
    pub created_at: String,
}

/// Row from `health_metrics`.
#[derive(Debug, Clone)]
pub struct HealthMetricRow {
    pub id: i64,
    pub process_type: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub timestamp: String,
    pub created_at: String,
}

/// Row from `config_history`.
#[derive(Debug, Clone)]
pub struct ConfigHistoryRow {
    pub id: i64,
    pub process_type: String,
    pub config_data: Option<Value>,
    pub config_hash: String,
    pub user_id: Option<String>,
    pub change_reason: Option<String>,
    pub created_at: String,
}

/// Row from `system_events`.
#[derive(Debug, Clone)]
pub struct SystemEventRow {
    pub id: i64,
    pub event_type: String,
    pub event_data: Option<Value>,
    pub severity: String,
    pub source: Option<String>,
    pub timestamp: String,
    pub created_at: String,
}

/// Row from `performance_metrics`.
#[derive(Debug, Clone)]
pub struct PerformanceMetricRow {
    pub id: i64,
    pub process_type: String,
    pub metric_type: String,
    pub value: f64,
    pub unit: Option<String>,
    pub timestamp: String,
    pub metadata: Option<Value>,
    pub created_at: String,
}

/// Lenient JSON column parse: corrupt payloads degrade to `None` rather
/// than failing the row.
pub(crate) fn parse_json_column(raw: Option<String>) -> Option<Value> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
}

// ──────────────────── read filters ────────────────────

/// Filter for [`crate::service::TelemetryStore::get_log_entries`]; unset
/// fields match everything.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub source: Option<String>,
    pub level: Option<Level>,
    pub component: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema;

    fn memory_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::apply_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn table_names_are_unique() {
        let tables: Vec<&str> = EntityKind::ALL.iter().map(|k| k.table()).collect();
        let unique: std::collections::HashSet<&&str> = tables.iter().collect();
        assert_eq!(tables.len(), unique.len());
    }

    #[test]
    fn audit_kinds_exempt_from_retention() {
        assert!(!EntityKind::ProcessStatus.swept_by_retention());
        assert!(!EntityKind::ConfigHistory.swept_by_retention());
        let swept = EntityKind::ALL
            .iter()
            .filter(|k| k.swept_by_retention())
            .count();
        assert_eq!(swept, 4);
    }

    #[test]
    fn kind_indices_are_dense() {
        let mut indices: Vec<usize> = EntityKind::ALL.iter().map(|k| k.index()).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn level_round_trips_through_serde() {
        for level in [
            Level::Debug,
            Level::Info,
            Level::Warn,
            Level::Error,
            Level::Critical,
        ] {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
            let back: Level = serde_json::from_str(&json).unwrap();
            assert_eq!(back, level);
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn timestamp_format_is_sortable() {
        let earlier = format_ts(DateTime::parse_from_rfc3339("2026-03-01T00:00:00Z").unwrap().to_utc());
        let later = format_ts(DateTime::parse_from_rfc3339("2026-03-01T00:00:01Z").unwrap().to_utc());
        assert!(earlier < later);
        assert!(earlier.ends_with('Z'));
    }

    #[test]
    fn log_record_inserts() {
        let conn = memory_conn();
        let mut record = LogRecord::new("enb", Level::Error, "rrc connection reject");
        record.layer = Some("rrc".to_string());
        record.rnti = Some("0x4601".to_string());
        record.fields = Some(serde_json::json!({"cause": "congestion"}));
        Record::Log(record).insert(&conn).unwrap();

        let (message, fields): (String, Option<String>) = conn
            .query_row("SELECT message, fields FROM log_entries", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(message, "rrc connection reject");
        assert!(fields.unwrap().contains("congestion"));
    }

    #[test]
    fn every_kind_inserts_into_its_table() {
        let conn = memory_conn();
        let ts = now_ts();
        let records = vec![
            Record::Log(LogRecord::new("core", Level::Info, "attach accepted")),
            Record::Status(ProcessStatusRecord {
                process_type: "enb".to_string(),
                pid: Some(4242),
                state: ProcessState::Running,
                start_time: Some(ts.clone()),
                stop_time: None,
                config: None,
                error_message: None,
            }),
            Record::Health(HealthMetricRecord {
                process_type: "enb".to_string(),
                metric_name: "cpu_pct".to_string(),
                metric_value: 37.5,
                timestamp: ts.clone(),
            }),
            Record::Config(ConfigRecord {
                process_type: "enb".to_string(),
                config_data: "{\"bandwidth\":20}".to_string(),
                config_hash: "deadbeefdeadbeef".to_string(),
                user_id: None,
                change_reason: Some("initial".to_string()),
            }),
            Record::Event(SystemEventRecord {
                event_type: "cell_up".to_string(),
                event_data: Some(serde_json::json!({"cell_id": 7})),
                severity: Level::Info,
                source: Some("enb".to_string()),
                timestamp: ts.clone(),
            }),
            Record::Perf(PerformanceMetricRecord {
                process_type: "enb".to_string(),
                metric_type: "throughput".to_string(),
                value: 94.2,
                unit: Some("mbps".to_string()),
                timestamp: ts,
                metadata: None,
            }),
        ];

        for record in &records {
            record.insert(&conn).unwrap();
        }
        for kind in EntityKind::ALL {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", kind.table()), [], |r| {
                    r.get(0)
                })
                .unwrap();
            assert_eq!(count, 1, "{kind} should hold one row");
        }
    }

    #[test]
    fn parse_json_column_is_lenient() {
        assert_eq!(parse_json_column(None), None);
        assert_eq!(parse_json_column(Some("not json".to_string())), None);
        assert_eq!(
            parse_json_column(Some("{\"a\":1}".to_string())),
            Some(serde_json::json!({"a": 1}))
        );
    }
}
