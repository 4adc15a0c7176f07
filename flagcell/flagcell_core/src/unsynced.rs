//! A boolean flag with no internal synchronization.

use crate::traits::BooleanFlag;

/// A bare boolean cell.
///
/// Mutation needs `&mut self`, so sharing one between threads requires the
/// caller to wrap it in a lock of their own. Use [`SyncedFlag`](crate::SyncedFlag)
/// when the flag itself should be shared.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UnsyncedFlag {
    state: bool,
}

impl UnsyncedFlag {
    /// Create a flag in the `false` state.
    pub fn new() -> Self {
        Self { state: false }
    }

    /// Invert the state.
    pub fn flip(&mut self) {
        self.state = !self.state;
    }

    /// Overwrite the state.
    pub fn set(&mut self, state: bool) {
        self.state = state;
    }

    /// Current state.
    pub fn is_true(&self) -> bool {
        self.state
    }
}

impl BooleanFlag for UnsyncedFlag {
    fn flip(&mut self) {
        UnsyncedFlag::flip(self);
    }

    fn set(&mut self, state: bool) {
        UnsyncedFlag::set(self, state);
    }

    fn is_true(&self) -> bool {
        UnsyncedFlag::is_true(self)
    }
}
