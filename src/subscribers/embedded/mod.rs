//! # Built-in subscribers
//!
//! Small, self-contained implementations for demos, tests and diagnostics.
//!
//! - [`LiveTracker`]: live driver handles per task name.
//! - [`LogWriter`]: prints events in a human-readable form (feature `logging`).

mod live;
#[cfg(feature = "logging")]
mod log;

pub use live::LiveTracker;
#[cfg(feature = "logging")]
pub use log::LogWriter;
