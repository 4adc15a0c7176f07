//! A boolean flag that can be shared between threads.

use crate::config::FlagConfig;
use crate::lock::{LockStats, StateLock};
use crate::traits::BooleanFlag;
use log::debug;
use std::fmt;

/// A boolean cell guarded by its own exclusive lock.
///
/// Every operation takes the lock, touches the boolean, and releases the lock
/// before returning, so concurrent calls behave as some sequential order of
/// the same calls. The lock is not reentrant.
pub struct SyncedFlag {
    state: StateLock<bool>,
}

impl SyncedFlag {
    /// Create an unnamed flag in the `false` state.
    pub fn new() -> Self {
        debug!("created synced flag (unnamed)");
        Self {
            state: StateLock::new(false),
        }
    }

    /// Create a flag in the `false` state whose lock traces under `name`.
    pub fn with_name(name: impl Into<String>) -> Self {
        let name = name.into();
        debug!("created synced flag {:?}", name);
        Self {
            state: StateLock::with_name(false, name),
        }
    }

    /// Create a flag from its configuration section.
    pub fn from_config(config: &FlagConfig) -> Self {
        match &config.name {
            Some(name) => Self::with_name(name.clone()),
            None => Self::new(),
        }
    }

    /// Invert the state.
    pub fn flip(&self) {
        let mut state = self.state.lock();
        *state = !*state;
    }

    /// Overwrite the state.
    pub fn set(&self, state: bool) {
        *self.state.lock() = state;
    }

    /// Current state.
    pub fn is_true(&self) -> bool {
        let state = self.state.lock();
        *state
    }

    /// Invert the state and return the value it was inverted to.
    ///
    /// Both happen under one acquisition, so the result is the state this
    /// call produced even when other threads flip concurrently.
    pub fn toggle(&self) -> bool {
        let mut state = self.state.lock();
        *state = !*state;
        *state
    }

    /// Debug name given at construction.
    pub fn name(&self) -> Option<&str> {
        self.state.name()
    }

    /// Lock usage since creation or the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> LockStats {
        self.state.stats()
    }

    /// Zero the lock usage counters.
    pub fn reset_stats(&self) {
        self.state.reset_stats();
    }
}

impl Default for SyncedFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SyncedFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncedFlag")
            .field("name", &self.name())
            .field("state", &self.is_true())
            .finish()
    }
}

impl BooleanFlag for SyncedFlag {
    fn flip(&mut self) {
        SyncedFlag::flip(self);
    }

    fn set(&mut self, state: bool) {
        SyncedFlag::set(self, state);
    }

    fn is_true(&self) -> bool {
        SyncedFlag::is_true(self)
    }

    fn toggle(&mut self) -> bool {
        SyncedFlag::toggle(self)
    }
}
