//! The operations shared by both flag variants.

/// A single boolean state cell.
///
/// Receivers are `&mut self` so that an implementation without internal
/// synchronization can only be driven by one owner at a time. Implementations
/// that synchronize internally also offer the same operations on `&self`.
pub trait BooleanFlag {
    /// Invert the current state.
    fn flip(&mut self);

    /// Replace the current state with `state`.
    fn set(&mut self, state: bool);

    /// Read the current state.
    fn is_true(&self) -> bool;

    /// Invert the current state and return the new value.
    fn toggle(&mut self) -> bool {
        self.flip();
        self.is_true()
    }
}
