//! Background timer ticker.
//!
//! The shared `mtime` counter is advanced by an independent thread at a fixed
//! wall-clock interval. The hart observes it at instruction boundaries. A
//! [`Wakeup`] signal lets a hart suspended in `WFI` sleep until the ticker or an
//! external stimulus changes something it might care about.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::common::lock;

/// Generation-counted wakeup signal.
///
/// Waiters remember the generation they last saw; `wait` returns as soon as the
/// generation moves, so a notification between observation and sleep is never lost.
#[derive(Debug, Default)]
pub struct Wakeup {
    generation: Mutex<u64>,
    cond: Condvar,
}

impl Wakeup {
    /// Creates a new signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current generation.
    pub fn generation(&self) -> u64 {
        *lock(&self.generation)
    }

    /// Bumps the generation and wakes every waiter.
    pub fn notify(&self) {
        let mut generation = lock(&self.generation);
        *generation = generation.wrapping_add(1);
        self.cond.notify_all();
    }

    /// Blocks until the generation differs from `seen` or `timeout` elapses.
    ///
    /// # Returns
    ///
    /// `true` if a notification arrived.
    pub fn wait(&self, seen: u64, timeout: Duration) -> bool {
        let guard = lock(&self.generation);
        let (guard, _) = self
            .cond
            .wait_timeout_while(guard, timeout, |g| *g == seen)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard != seen
    }
}

/// Thread advancing the shared time counter.
///
/// Stopped and joined when dropped.
pub struct TimerTicker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TimerTicker {
    /// Spawns the ticker.
    ///
    /// # Arguments
    ///
    /// * `mtime` - The shared counter.
    /// * `interval` - Wall-clock period between increments.
    /// * `increment` - Amount added per period.
    /// * `wakeup` - Signal notified after each increment.
    pub fn spawn(
        mtime: Arc<AtomicU64>,
        interval: Duration,
        increment: u64,
        wakeup: Arc<Wakeup>,
    ) -> std::io::Result<Self> {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("rvhart-timer".into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let _ = mtime.fetch_add(increment, Ordering::AcqRel);
                            wakeup.notify();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;
        debug!(?interval, increment, "timer: ticker started");
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it to exit.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            debug!("timer: ticker stopped");
        }
    }
}

impl std::fmt::Debug for TimerTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerTicker")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl Drop for TimerTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
