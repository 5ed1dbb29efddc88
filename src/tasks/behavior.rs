//! # Behaviors: the unit of work a timer invokes.
//!
//! A behavior is any `Fn() -> Result<(), BehaviorError>` that is `Send + Sync`.
//! Tasks store it behind a [`BehaviorRef`] (`Arc<dyn Fn ...>`) inside a
//! [`LatestCell`](crate::LatestCell), so replacing it is a pointer swap.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use tickvisor::{BehaviorRef, behavior};
//!
//! let hits = Arc::new(AtomicU32::new(0));
//! let h = Arc::clone(&hits);
//! let b: BehaviorRef = behavior(move || {
//!     h.fetch_add(1, Ordering::Relaxed);
//!     Ok(())
//! });
//!
//! b().unwrap();
//! assert_eq!(hits.load(Ordering::Relaxed), 1);
//! ```

use std::sync::Arc;

use crate::error::BehaviorError;

/// Shared, type-erased behavior.
pub type BehaviorRef = Arc<dyn Fn() -> Result<(), BehaviorError> + Send + Sync>;

/// Wraps a closure into a [`BehaviorRef`].
pub fn behavior<F>(f: F) -> BehaviorRef
where
    F: Fn() -> Result<(), BehaviorError> + Send + Sync + 'static,
{
    Arc::new(f)
}
