//! # Single-slot holder for the latest value.
//!
//! [`LatestCell`] always reflects the value passed to the most recent
//! [`set`](LatestCell::set). Clones share the slot: the task keeps one clone to
//! write, the driver-side ticker keeps another to read.
//!
//! ## Rules
//! - `set` is a plain write: no notification, no side effects
//! - `get` returns a clone, so the lock is never held by the caller
//! - A poisoned lock is recovered (the slot always holds a complete value)

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared single-slot mutable holder.
///
/// # Example
/// ```
/// use tickvisor::LatestCell;
///
/// let cell = LatestCell::new(1);
/// let reader = cell.clone();
/// cell.set(2);
/// assert_eq!(reader.get(), 2);
/// ```
pub struct LatestCell<T> {
    slot: Arc<RwLock<T>>,
}

impl<T: Clone> LatestCell<T> {
    /// Creates a cell holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            slot: Arc::new(RwLock::new(initial)),
        }
    }

    /// Replaces the current value.
    pub fn set(&self, value: T) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Replaces the current value and returns the previous one.
    pub fn replace(&self, value: T) -> T {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, value)
    }

    /// Returns a clone of the most recently set value.
    pub fn get(&self) -> T {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T> Clone for LatestCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LatestCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("LatestCell").field("current", &*slot).finish()
    }
}
