//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by tasks, supervisors, tickers and
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `RepeatingTask`, `OneShotTask`, `TaskSupervisor`, the ticker
//!   invoked by the timer driver, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by `SchedulerBuilder::build`
//!   (fans out to `SubscriberSet`), and any receiver from `Scheduler::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
