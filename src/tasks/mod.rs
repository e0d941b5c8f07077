//! Background tasks: periodic flush scheduling and retention sweeping.

pub mod flush;
pub mod sweeper;

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};

use crate::core::errors::{Result, StoreError};

/// A named background thread running a job on a fixed period until stopped.
///
/// Stopping joins the thread, so a tick in flight completes before `stop`
/// returns. Dropping without an explicit stop also shuts the thread down.
pub(crate) struct PeriodicTask {
    shutdown_tx: Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl PeriodicTask {
    pub(crate) fn spawn<F>(name: &str, period: Duration, job: F) -> Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let ticker = tick(period);
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                loop {
                    select! {
                        recv(ticker) -> _ => job(),
                        recv(shutdown_rx) -> _ => break,
                    }
                }
            })
            .map_err(|e| StoreError::Runtime {
                details: format!("failed to spawn {name} thread: {e}"),
            })?;
        Ok(Self {
            shutdown_tx,
            join: Some(join),
        })
    }

    /// Signal shutdown and wait for the thread to finish.
    pub(crate) fn stop(mut self) {
        self.stop_inner();
    }

    fn stop_inner(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop_inner();
    }
}
