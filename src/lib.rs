//! # tickvisor
//!
//! **Tickvisor** provides interval and timeout timers that are safe against
//! stale callbacks.
//!
//! A timer never closes over the behavior it runs. It closes over a single-slot
//! cell and reads the *latest* behavior at fire time, so callers can swap the
//! behavior at any moment without re-registering the timer. Period changes tear
//! the old registration down before creating the new one, and an optional
//! supervisor turns repeated start / stop / reset commands into exactly one
//! effect each.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller ── set_behavior ──► LatestCell<BehaviorRef> ◄── reads at fire time ──┐
//!     │                                                                        │
//!     ├── set_period / stop ──► RepeatingTask ─┐                               │
//!     ├── cancel            ──► OneShotTask   ─┼──► Scheduler ──► TimerDriver ──► Ticker
//!     └── start/stop/reset  ──► TaskSupervisor ┘        │        (Tokio/Manual)    │
//!                                                       │                          │
//!                                                       ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel of Event)                           │
//! │                        (capacity: Config::bus_capacity)                           │
//! └───────────────────────────────────────┬───────────────────────────────────────────┘
//!                                         ▼
//!                              ┌────────────────────┐
//!                              │  bus listener      │
//!                              │  (SchedulerBuilder)│
//!                              └─────────┬──────────┘
//!                                        ▼
//!                                  SubscriberSet
//!                                 (per-sub queues)
//!                              ┌─────────┼─────────┐
//!                              ▼         ▼         ▼
//!                          LogWriter LiveTracker  custom
//! ```
//!
//! ### Tick
//! ```text
//! driver fires registration
//!   ├─► one-shot: mark fired
//!   ├─► ticks += 1, publish TickFired
//!   └─► behavior = cell.get()        (latest write wins)
//!         ├─ Ok      ──► done
//!         ├─ Err(e)  ──► publish BehaviorFailed   (timer keeps running)
//!         └─ panic   ──► publish BehaviorPanicked (timer keeps running)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Tasks**         | Interval and timeout timers with swappable behaviors.        | [`RepeatingTask`], [`OneShotTask`]          |
//! | **Supervision**   | Idempotent start / stop / reset over any timed task.         | [`TaskSupervisor`], [`Timed`]               |
//! | **Drivers**       | Pluggable timer primitives, production and deterministic.    | [`TimerDriver`], [`TokioDriver`], [`ManualDriver`] |
//! | **Subscriber API**| Hook into registrations, ticks and failures.                 | [`Subscribe`], [`LiveTracker`]              |
//! | **Errors**        | Typed errors for scheduling, drivers and behaviors.          | [`ScheduleError`], [`DriverError`], [`BehaviorError`] |
//! | **Configuration** | Centralize runtime settings.                                 | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//! use tickvisor::{Config, ManualDriver, Scheduler};
//!
//! let driver = Arc::new(ManualDriver::new());
//! let sched = Scheduler::with_driver(Config::default(), driver.clone());
//!
//! let hits = Arc::new(AtomicU32::new(0));
//! let h = Arc::clone(&hits);
//! let task = sched
//!     .repeating("poll", Duration::from_millis(100), move || {
//!         h.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! driver.advance(Duration::from_millis(100));
//!
//! // Swap the behavior; the timer stays registered.
//! let h = Arc::clone(&hits);
//! task.set_behavior(move || {
//!     h.fetch_add(100, Ordering::Relaxed);
//!     Ok(())
//! });
//! driver.advance(Duration::from_millis(100));
//! assert_eq!(hits.load(Ordering::Relaxed), 101);
//!
//! // Supervised restart: one cancel, one registration.
//! let mut sup = sched.supervise(task);
//! sup.reset().unwrap();
//! assert!(sup.is_running());
//! assert_eq!(sched.live_timers(), 1);
//! assert_eq!(sup.task().name(), "poll");
//! ```
//!
//! With the production driver the same code runs on tokio:
//! ```no_run
//! use std::time::Duration;
//! use tickvisor::{Config, Scheduler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), tickvisor::ScheduleError> {
//!     let sched = Scheduler::builder(Config::default()).build();
//!     let _heartbeat = sched.repeating("heartbeat", Duration::from_secs(1), || {
//!         println!("alive");
//!         Ok(())
//!     })?;
//!     tokio::time::sleep(Duration::from_secs(5)).await;
//!     Ok(())
//! }
//! ```
mod core;
mod driver;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{Config, MissedTick, Scheduler, SchedulerBuilder};
pub use driver::{DriverCall, ManualDriver, TickFn, TimerDriver, TimerHandle, TimerKind, TokioDriver};
pub use error::{BehaviorError, DriverError, ScheduleError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{LiveTracker, Subscribe, SubscriberSet};
pub use tasks::{
    BehaviorRef, LatestCell, OneShotTask, Period, RepeatingTask, SupervisorOptions, TaskState,
    TaskSupervisor, Timed, behavior, checked_millis,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
