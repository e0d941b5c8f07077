//! Query executor: parameterized access over one serialized connection.
//!
//! Callers never see the storage engine's API shape — they hand over SQL
//! plus positional parameters and get rows or outcomes back. The connection
//! sits behind a mutex, so statements execute one at a time in submission
//! order (single-writer discipline for an embedded single-file store).

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, Params, Row};

use crate::core::errors::{Result, StoreError};
use crate::store::records::Record;
use crate::store::schema;

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy)]
pub struct ExecOutcome {
    /// Rowid of the last inserted row on this connection.
    pub last_insert_id: i64,
    /// Rows affected by the statement.
    pub rows_affected: usize,
}

/// Outcome of one transactional batch insert.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Items persisted.
    pub inserted: usize,
    /// Items that failed individually and were dropped.
    pub failed: usize,
    /// First per-item failure, for diagnostics.
    pub first_error: Option<String>,
}

/// Serialized connection handle. Opening runs the schema manager, so a
/// successfully constructed executor always sees all six tables.
#[derive(Debug)]
pub struct StoreExecutor {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl StoreExecutor {
    /// Open (or create) the database at `path`, applying PRAGMAs and schema.
    ///
    /// Any failure here — unwritable directory, unopenable file, schema
    /// application error — is reported as `StorageUnavailable` so the
    /// facade can fall back to buffer-only mode.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::StorageUnavailable {
                path: path.to_path_buf(),
                details: format!("cannot create data directory: {source}"),
            })?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::StorageUnavailable {
            path: path.to_path_buf(),
            details: source.to_string(),
        })?;

        schema::apply_pragmas(&conn).map_err(|e| unavailable(path, &e))?;
        schema::apply_schema(&conn).map_err(|e| unavailable(path, &e))?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    /// Path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run an INSERT/UPDATE/DELETE statement.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<ExecOutcome> {
        let conn = self.conn.lock();
        let rows_affected = conn.prepare_cached(sql)?.execute(params)?;
        Ok(ExecOutcome {
            last_insert_id: conn.last_insert_rowid(),
            rows_affected,
        })
    }

    /// Run a query expected to yield at most one row.
    pub fn query_one<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(sql)?;
        let mut rows = stmt.query(params)?;
        match rows.next()? {
            Some(row) => Ok(Some(map(row)?)),
            None => Ok(None),
        }
    }

    /// Run a query and map every row.
    pub fn query_all<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Insert a drained batch inside one transaction.
    ///
    /// A failing item is dropped and counted; it never aborts the rest of
    /// the batch. The returned error covers batch-level failures only
    /// (begin/commit), in which case nothing was persisted and the caller
    /// may re-enqueue.
    pub(crate) fn insert_batch(&self, items: &[Record]) -> Result<BatchReport> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut inserted = 0;
        let mut failed = 0;
        let mut first_error = None;
        for item in items {
            match item.insert(&tx) {
                Ok(()) => inserted += 1,
                Err(e) => {
                    failed += 1;
                    if first_error.is_none() {
                        first_error = Some(e.to_string());
                    }
                }
            }
        }
        tx.commit()?;
        Ok(BatchReport {
            inserted,
            failed,
            first_error,
        })
    }
}

fn unavailable(path: &Path, error: &StoreError) -> StoreError {
    StoreError::StorageUnavailable {
        path: path.to_path_buf(),
        details: error.to_string(),
    }
}
