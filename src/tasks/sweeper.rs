//! Retention sweeper: bounds storage growth over time.
//!
//! Deletes rows older than the retention horizon from the four
//! retention-subject tables. `process_status` and `config_history` are
//! audit trails and are never touched. Runs independently of the flush
//! scheduler; since the sweep only removes rows older than the cutoff and
//! flushes only insert rows with current timestamps, the two never contend
//! over the same key range.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rusqlite::params;

use crate::core::errors::Result;
use crate::service::StoreCore;
use crate::store::executor::StoreExecutor;
use crate::store::records::{EntityKind, format_ts};
use crate::tasks::PeriodicTask;

/// Outcome of one sweep pass.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// Rows with `timestamp` strictly below this were eligible for deletion.
    pub cutoff: String,
    /// (table, rows deleted) per retention-subject table that swept cleanly.
    pub swept: Vec<(&'static str, usize)>,
    /// Tables whose DELETE failed (already logged).
    pub failures: usize,
}

impl SweepReport {
    /// Total rows removed across tables.
    #[must_use]
    pub fn total_deleted(&self) -> usize {
        self.swept.iter().map(|(_, n)| n).sum()
    }
}

/// Spawn the periodic sweep thread.
pub(crate) fn spawn(core: Arc<StoreCore>, period: Duration) -> Result<PeriodicTask> {
    PeriodicTask::spawn("tstore-sweep", period, move || {
        let Some(executor) = core.executor.as_ref() else {
            return;
        };
        let report = sweep_once(executor, core.config.retention.days);
        for (table, deleted) in &report.swept {
            eprintln!(
                "[TSTORE-SWEEP] {table}: deleted {deleted} rows older than {}",
                report.cutoff
            );
        }
    })
}

/// Run one sweep pass against the store.
///
/// Tables are swept independently; a failing DELETE is logged and counted
/// without aborting the pass.
pub fn sweep_once(executor: &StoreExecutor, retention_days: u32) -> SweepReport {
    let cutoff = format_ts(Utc::now() - chrono::Duration::days(i64::from(retention_days)));
    let mut swept = Vec::new();
    let mut failures = 0;

    for kind in EntityKind::ALL {
        if !kind.swept_by_retention() {
            continue;
        }
        let sql = format!("DELETE FROM {} WHERE timestamp < ?1", kind.table());
        match executor.execute(&sql, params![cutoff]) {
            Ok(outcome) => swept.push((kind.table(), outcome.rows_affected)),
            Err(error) => {
                failures += 1;
                eprintln!("[TSTORE-SWEEP] ERROR: sweep of {kind} failed: {error}");
            }
        }
    }

    SweepReport {
        cutoff,
        swept,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_executor() -> (tempfile::TempDir, StoreExecutor) {
        let dir = tempfile::tempdir().unwrap();
        let executor = StoreExecutor::open(&dir.path().join("sweep.sqlite3")).unwrap();
        (dir, executor)
    }

    fn days_ago(days: i64) -> String {
        format_ts(Utc::now() - chrono::Duration::days(days))
    }

    #[test]
    fn sweep_removes_only_expired_rows() {
        let (_dir, executor) = temp_executor();
        for (age_days, name) in [(40, "old"), (10, "fresh")] {
            executor
                .execute(
                    "INSERT INTO health_metrics (process_type, metric_name, metric_value, timestamp)
                     VALUES (?1, ?2, ?3, ?4)",
                    params!["enb", name, 1.0, days_ago(age_days)],
                )
                .unwrap();
        }

        let report = sweep_once(&executor, 30);
        assert_eq!(report.failures, 0);
        assert_eq!(report.total_deleted(), 1);

        let survivors: Vec<String> = executor
            .query_all("SELECT metric_name FROM health_metrics", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(survivors, vec!["fresh"]);
    }

    #[test]
    fn sweep_spares_audit_tables() {
        let (_dir, executor) = temp_executor();
        executor
            .execute(
                "INSERT INTO process_status (process_type, status, created_at)
                 VALUES (?1, ?2, ?3)",
                params!["enb", "running", days_ago(400)],
            )
            .unwrap();
        executor
            .execute(
                "INSERT INTO config_history (process_type, config_data, config_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params!["enb", "{}", "0000000000000000", days_ago(400)],
            )
            .unwrap();

        let report = sweep_once(&executor, 30);
        assert_eq!(report.total_deleted(), 0);
        assert!(
            report
                .swept
                .iter()
                .all(|(table, _)| *table != "process_status" && *table != "config_history")
        );

        for table in ["process_status", "config_history"] {
            let count: i64 = executor
                .query_one(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .unwrap()
                .unwrap();
            assert_eq!(count, 1, "{table} must keep its audit rows");
        }
    }

    #[test]
    fn sweep_covers_all_retention_tables() {
        let (_dir, executor) = temp_executor();
        executor
            .execute(
                "INSERT INTO log_entries (timestamp, source, level, message)
                 VALUES (?1, 'x', 'info', 'm')",
                params![days_ago(31)],
            )
            .unwrap();
        executor
            .execute(
                "INSERT INTO system_events (event_type, severity, timestamp)
                 VALUES ('e', 'info', ?1)",
                params![days_ago(31)],
            )
            .unwrap();
        executor
            .execute(
                "INSERT INTO performance_metrics (process_type, metric_type, value, timestamp)
                 VALUES ('p', 't', 1.0, ?1)",
                params![days_ago(31)],
            )
            .unwrap();

        let report = sweep_once(&executor, 30);
        assert_eq!(report.swept.len(), 4);
        assert_eq!(report.total_deleted(), 3);
        // A second pass finds nothing left.
        assert_eq!(sweep_once(&executor, 30).total_deleted(), 0);
    }

    #[test]
    fn cutoff_comparison_is_strict() {
        let (_dir, executor) = temp_executor();
        let cutoff = days_ago(30);
        executor
            .execute(
                "INSERT INTO system_events (event_type, severity, timestamp)
                 VALUES ('edge', 'info', ?1)",
                params![cutoff],
            )
            .unwrap();
        // Same predicate the sweep issues: a row stamped exactly at the
        // cutoff is not "older than" it.
        let deleted = executor
            .execute(
                "DELETE FROM system_events WHERE timestamp < ?1",
                params![cutoff],
            )
            .unwrap();
        assert_eq!(deleted.rows_affected, 0);
    }
}
