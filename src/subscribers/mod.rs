//! # Event subscribers for the scheduler.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations fed by the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Ticker / tasks ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                                 │
//!                                              ┌──────────────────┼───────────┐
//!                                              ▼                  ▼           ▼
//!                                          LogWriter         LiveTracker    Custom
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** observe and react to events (logging, metrics, alerts)
//! - **Stateful subscribers** maintain state derived from events ([`LiveTracker`])

mod embedded;
mod subscribe;
mod subscriber_set;

pub use embedded::LiveTracker;
#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
