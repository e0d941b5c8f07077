//! Batch buffer: bounded per-kind queues absorbing high-frequency writes.
//!
//! One queue per entity kind, each behind its own mutex so draining one
//! kind never blocks producers of another. Queues are bounded; overflow
//! drops the oldest item and counts it (producers are never blocked).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::store::records::{EntityKind, Record};

struct KindQueue {
    items: VecDeque<Record>,
    /// Consecutive whole-batch flush failures for this kind.
    flush_failures: u32,
}

impl KindQueue {
    fn new() -> Self {
        Self {
            items: VecDeque::new(),
            flush_failures: 0,
        }
    }
}

/// Per-kind in-memory write queues. Shared state is reachable only through
/// `enqueue`/`drain`/`requeue_front`; the queues themselves never leak out.
pub(crate) struct BatchBuffer {
    queues: [Mutex<KindQueue>; 6],
    batch_size: usize,
    capacity: usize,
    dropped: AtomicU64,
}

impl BatchBuffer {
    pub(crate) fn new(batch_size: usize, capacity: usize) -> Self {
        Self {
            queues: std::array::from_fn(|_| Mutex::new(KindQueue::new())),
            batch_size,
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Append a record to its kind's queue, evicting the oldest item when
    /// the queue is at capacity.
    pub(crate) fn enqueue(&self, record: Record) {
        let kind = record.kind();
        let mut queue = self.queues[kind.index()].lock();
        if queue.items.len() >= self.capacity {
            queue.items.pop_front();
            self.count_drop(kind, 1);
        }
        queue.items.push_back(record);
    }

    /// Whether the queue for `kind` has reached the immediate-flush threshold.
    pub(crate) fn should_flush(&self, kind: EntityKind) -> bool {
        self.queues[kind.index()].lock().items.len() >= self.batch_size
    }

    /// Atomically empty the queue for `kind` and return its contents in
    /// enqueue order. Items enqueued after the lock is released land in the
    /// next drain.
    pub(crate) fn drain(&self, kind: EntityKind) -> Vec<Record> {
        let mut queue = self.queues[kind.index()].lock();
        std::mem::take(&mut queue.items).into()
    }

    /// Put a failed batch back at the head of its queue, preserving FIFO
    /// order relative to items enqueued in the meantime. Overflow beyond
    /// capacity evicts from the front (the oldest of the requeued items).
    pub(crate) fn requeue_front(&self, kind: EntityKind, items: Vec<Record>) {
        let mut queue = self.queues[kind.index()].lock();
        for item in items.into_iter().rev() {
            queue.items.push_front(item);
        }
        let mut evicted = 0;
        while queue.items.len() > self.capacity {
            queue.items.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            self.count_drop(kind, evicted);
        }
    }

    /// Record a whole-batch flush failure; returns the consecutive count.
    pub(crate) fn record_flush_failure(&self, kind: EntityKind) -> u32 {
        let mut queue = self.queues[kind.index()].lock();
        queue.flush_failures += 1;
        queue.flush_failures
    }

    /// Clear the consecutive-failure counter after a successful flush.
    pub(crate) fn reset_flush_failures(&self, kind: EntityKind) {
        self.queues[kind.index()].lock().flush_failures = 0;
    }

    /// Current queue length for `kind`.
    pub(crate) fn len(&self, kind: EntityKind) -> usize {
        self.queues[kind.index()].lock().items.len()
    }

    /// Buffered items across all kinds.
    pub(crate) fn total_len(&self) -> usize {
        EntityKind::ALL.iter().map(|k| self.len(*k)).sum()
    }

    /// Items dropped to the overflow policy since construction.
    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn count_drop(&self, kind: EntityKind, n: u64) {
        let total = self.dropped.fetch_add(n, Ordering::Relaxed) + n;
        // Log on power-of-two totals to keep a flooded buffer from
        // flooding stderr too.
        if total.is_power_of_two() {
            eprintln!(
                "[TSTORE-BUFFER] WARNING: {total} items dropped so far (capacity {} reached on {kind})",
                self.capacity
            );
        }
    }
}
