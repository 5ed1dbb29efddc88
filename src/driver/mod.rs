//! # Timer drivers: the platform timer primitives.
//!
//! A [`TimerDriver`] is the only external collaborator of the crate. Tasks never
//! talk to tokio (or any other clock) directly; they register a [`TickFn`] with
//! the driver injected through the [`Scheduler`](crate::Scheduler) and keep the
//! returned [`TimerHandle`] as proof that the registration is live.
//!
//! ## Contract
//! ```text
//! register_repeating(period, tick) ─► TimerHandle   (tick called every period)
//! register_once(delay, tick)       ─► TimerHandle   (tick called once, then gone)
//! cancel(handle)                   ─► ()            (idempotent; unknown handles ignored)
//! ```
//!
//! ## Rules
//! - Handles are never reused by a driver instance.
//! - `cancel` prevents every tick that has not started yet; a tick already in
//!   flight may still complete.
//! - The driver never inspects behaviors: the tick closure resolves the current
//!   behavior itself at fire time.
//!
//! ## Implementations
//! - [`TokioDriver`]: production driver, one tokio task per registration.
//! - [`ManualDriver`]: deterministic fake clock with a call log, for tests.

mod handle;
mod manual;
mod runtime;

use std::sync::Arc;
use std::time::Duration;

use crate::error::DriverError;

pub use handle::{TimerHandle, TimerKind};
pub use manual::{DriverCall, ManualDriver};
pub use runtime::TokioDriver;

/// Closure invoked by a driver on every tick.
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// Platform timer primitives consumed by tasks.
pub trait TimerDriver: Send + Sync + 'static {
    /// Registers `tick` to run every `period`, first after one full period.
    fn register_repeating(&self, period: Duration, tick: TickFn)
    -> Result<TimerHandle, DriverError>;

    /// Registers `tick` to run once after `delay`.
    fn register_once(&self, delay: Duration, tick: TickFn) -> Result<TimerHandle, DriverError>;

    /// Cancels a registration. Unknown or already finished handles are ignored.
    fn cancel(&self, handle: TimerHandle);

    /// Number of registrations that may still fire.
    fn live_timers(&self) -> usize;
}
