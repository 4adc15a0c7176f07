//! Tracked exclusive lock backing [`SyncedFlag`](crate::SyncedFlag).
//!
//! The lock owns the value it guards, so the value can only be reached through
//! a guard. Acquisition and hold times are recorded next to the mutex with
//! relaxed atomics; they are diagnostics only and never order flag accesses.

use log::trace;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Snapshot of lock usage counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockStats {
    /// Number of successful acquisitions
    pub acquisitions: u64,

    /// Total time spent waiting for the lock (microseconds)
    pub total_wait_us: u64,

    /// Longest single wait (microseconds)
    pub max_wait_us: u64,

    /// Total time the lock was held (microseconds)
    pub total_hold_us: u64,

    /// Longest single hold (microseconds)
    pub max_hold_us: u64,
}

impl LockStats {
    /// Ratio of average wait time to average hold time.
    ///
    /// Zero when the lock was never taken or was never measurably held.
    pub fn contention_factor(&self) -> f64 {
        if self.acquisitions == 0 || self.total_hold_us == 0 {
            return 0.0;
        }

        let avg_wait = self.total_wait_us as f64 / self.acquisitions as f64;
        let avg_hold = self.total_hold_us as f64 / self.acquisitions as f64;
        avg_wait / avg_hold
    }
}

#[derive(Debug, Default)]
struct Counters {
    acquisitions: AtomicU64,
    total_wait_us: AtomicU64,
    max_wait_us: AtomicU64,
    total_hold_us: AtomicU64,
    max_hold_us: AtomicU64,
}

impl Counters {
    fn record_wait(&self, wait_us: u64) {
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        self.total_wait_us.fetch_add(wait_us, Ordering::Relaxed);
        self.max_wait_us.fetch_max(wait_us, Ordering::Relaxed);
    }

    fn record_hold(&self, hold_us: u64) {
        self.total_hold_us.fetch_add(hold_us, Ordering::Relaxed);
        self.max_hold_us.fetch_max(hold_us, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LockStats {
        LockStats {
            acquisitions: self.acquisitions.load(Ordering::Relaxed),
            total_wait_us: self.total_wait_us.load(Ordering::Relaxed),
            max_wait_us: self.max_wait_us.load(Ordering::Relaxed),
            total_hold_us: self.total_hold_us.load(Ordering::Relaxed),
            max_hold_us: self.max_hold_us.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.acquisitions.store(0, Ordering::Relaxed);
        self.total_wait_us.store(0, Ordering::Relaxed);
        self.max_wait_us.store(0, Ordering::Relaxed);
        self.total_hold_us.store(0, Ordering::Relaxed);
        self.max_hold_us.store(0, Ordering::Relaxed);
    }
}

/// A non-reentrant mutex that owns its value and keeps usage statistics.
///
/// Acquisition always blocks until the lock is free; there is no timeout or
/// try variant. Locking twice from the same thread deadlocks.
pub struct StateLock<T> {
    mutex: Mutex<T>,
    counters: Counters,
    name: Option<String>,
}

/// Scoped access to the value inside a [`StateLock`].
///
/// The lock is released when the guard is dropped.
pub struct StateGuard<'a, T> {
    guard: MutexGuard<'a, T>,
    lock: &'a StateLock<T>,
    acquired_at: Instant,
}

impl<T> StateLock<T> {
    /// Create an unnamed lock around `value`.
    pub fn new(value: T) -> Self {
        Self {
            mutex: Mutex::new(value),
            counters: Counters::default(),
            name: None,
        }
    }

    /// Create a lock whose name appears in trace output.
    pub fn with_name(value: T, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(value)
        }
    }

    /// Block until the lock is free, then take it.
    pub fn lock(&self) -> StateGuard<'_, T> {
        let start = Instant::now();
        let guard = self.mutex.lock();
        let wait = start.elapsed();

        self.counters.record_wait(wait.as_micros() as u64);
        trace!(
            "lock acquired: {} (wait: {:.3}ms)",
            self.label(),
            wait.as_secs_f64() * 1000.0
        );

        StateGuard {
            guard,
            lock: self,
            acquired_at: Instant::now(),
        }
    }

    /// Usage counters accumulated since creation or the last reset.
    pub fn stats(&self) -> LockStats {
        self.counters.snapshot()
    }

    /// Zero all usage counters.
    pub fn reset_stats(&self) {
        self.counters.reset();
    }

    /// Debug name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Consume the lock and return the guarded value.
    pub fn into_inner(self) -> T {
        self.mutex.into_inner()
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

impl<T> Drop for StateGuard<'_, T> {
    fn drop(&mut self) {
        let hold = self.acquired_at.elapsed();
        self.lock.counters.record_hold(hold.as_micros() as u64);

        trace!(
            "lock released: {} (held: {:.3}ms)",
            self.lock.label(),
            hold.as_secs_f64() * 1000.0
        );
    }
}

impl<T> std::ops::Deref for StateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<T> std::ops::DerefMut for StateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}
