//! Flush scheduler: bounded staleness for buffered writes.
//!
//! A periodic pass drains every non-empty kind into the store, one
//! transaction per kind. Kinds are isolated: a failing flush for one kind
//! never blocks the others. Whole-batch failures re-enqueue the drained
//! items at the head of their queue and retry on later passes, up to the
//! configured limit; after that the batch is dropped with an error log.

use std::sync::Arc;
use std::time::Duration;

use crate::core::errors::Result;
use crate::service::StoreCore;
use crate::store::records::EntityKind;
use crate::tasks::PeriodicTask;

/// Spawn the timer-driven flush thread.
pub(crate) fn spawn(core: Arc<StoreCore>, period: Duration) -> Result<PeriodicTask> {
    PeriodicTask::spawn("tstore-flush", period, move || flush_pass(&core))
}

/// Drain every kind with buffered items. Used by the periodic thread and
/// by shutdown draining.
pub(crate) fn flush_pass(core: &StoreCore) {
    for kind in EntityKind::ALL {
        flush_kind(core, kind);
    }
}

/// Drain and persist one kind's queue.
pub(crate) fn flush_kind(core: &StoreCore, kind: EntityKind) {
    let Some(executor) = core.executor.as_ref() else {
        return;
    };
    if core.buffer.len(kind) == 0 {
        return;
    }
    // Drain and insert under the per-kind flush lock: a concurrent flusher
    // must not get its drained batch in ahead of an earlier one.
    let _guard = core.flush_locks[kind.index()].lock();
    let items = core.buffer.drain(kind);
    if items.is_empty() {
        return;
    }

    match executor.insert_batch(&items) {
        Ok(report) => {
            core.buffer.reset_flush_failures(kind);
            if report.failed > 0 {
                eprintln!(
                    "[TSTORE-FLUSH] WARNING: dropped {} of {} {kind} items: {}",
                    report.failed,
                    items.len(),
                    report.first_error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        Err(error) => {
            let attempts = core.buffer.record_flush_failure(kind);
            if attempts <= core.config.batch.max_flush_retries {
                eprintln!(
                    "[TSTORE-FLUSH] WARNING: flush of {} {kind} items failed \
                     (attempt {attempts}): {error}; re-enqueued",
                    items.len()
                );
                core.buffer.requeue_front(kind, items);
            } else {
                eprintln!(
                    "[TSTORE-FLUSH] ERROR: flush of {} {kind} items failed after \
                     {attempts} attempts: {error}; batch dropped",
                    items.len()
                );
                core.buffer.reset_flush_failures(kind);
            }
        }
    }
}
