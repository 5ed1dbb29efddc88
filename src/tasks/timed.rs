//! # Timed abstraction supervised by [`TaskSupervisor`](crate::TaskSupervisor).
//!
//! A `Timed` value owns at most one driver registration and can arm it, disarm
//! it, and invoke its current behavior on demand. [`RepeatingTask`](crate::RepeatingTask)
//! and [`OneShotTask`](crate::OneShotTask) implement it; user types wrapping
//! their own timers can too.

use crate::error::ScheduleError;

/// Something with a single armable timer.
///
/// ### Contract
/// - `arm` on an armed value is a no-op returning `Ok(())`
/// - `disarm` on a disarmed value is a no-op
/// - `is_armed()` is `true` exactly while a registration is held
/// - `arm` must release nothing and register nothing when it fails
pub trait Timed {
    /// Stable, human-readable name.
    fn name(&self) -> &str;

    /// Registers the timer if it is not registered yet.
    fn arm(&mut self) -> Result<(), ScheduleError>;

    /// Cancels the timer if it is registered.
    fn disarm(&mut self);

    /// Whether a registration is currently held.
    fn is_armed(&self) -> bool;

    /// Runs the current behavior once on the calling thread.
    fn invoke_now(&self);
}
