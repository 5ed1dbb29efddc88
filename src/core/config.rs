//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for a [`Scheduler`](crate::Scheduler).
//!
//! Config is used in three ways:
//! 1. **Scheduler creation**: `Scheduler::builder(config)`
//! 2. **Default driver**: `TokioDriver::from_config(&config)`
//! 3. **Period validation**: every task checks its period through [`Config::check_period`]
//!
//! ## Sentinel values
//! - `max_timers = 0` → unlimited live timers
//! - `min_period = 0s` → no floor (zero periods are still rejected)

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::error::ScheduleError;
use crate::tasks::Period;

/// How a repeating timer catches up after ticks were missed (e.g. a stalled runtime).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissedTick {
    /// Fire all missed ticks back to back.
    Burst,
    /// Fire once, then restart the period from that moment.
    Delay,
    /// Fire once and stay aligned to the original schedule.
    #[default]
    Skip,
}

impl From<MissedTick> for MissedTickBehavior {
    fn from(value: MissedTick) -> Self {
        match value {
            MissedTick::Burst => MissedTickBehavior::Burst,
            MissedTick::Delay => MissedTickBehavior::Delay,
            MissedTick::Skip => MissedTickBehavior::Skip,
        }
    }
}

/// Global configuration for a scheduler.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `min_period`: Shortest accepted repeating period (`0s` = no floor)
/// - `max_timers`: Live timer limit for the default driver (`0` = unlimited)
/// - `missed_tick`: Catch-up behavior for the default driver
/// - `immediate`: Default [`SupervisorOptions::immediate`](crate::SupervisorOptions)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Shortest period a repeating task accepts.
    ///
    /// Protects the runtime from accidental busy loops (`Duration::from_nanos(1)`).
    pub min_period: Duration,

    /// Maximum number of live timers for the default [`TokioDriver`](crate::TokioDriver).
    ///
    /// - `0` = unlimited
    /// - `n > 0` = registration fails with `DriverError::Exhausted` beyond `n`
    pub max_timers: usize,

    /// Missed tick behavior for the default driver.
    pub missed_tick: MissedTick,

    /// Whether supervisors created via `Scheduler::supervise` invoke the behavior on start.
    pub immediate: bool,
}

impl Config {
    /// Returns the live timer limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` live timers
    #[inline]
    pub fn timer_limit(&self) -> Option<usize> {
        if self.max_timers == 0 {
            None
        } else {
            Some(self.max_timers)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Validates a repeating period against this configuration.
    ///
    /// The paused sentinel is always valid.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use tickvisor::{Config, Period, ScheduleError};
    ///
    /// let cfg = Config::default();
    /// assert!(cfg.check_period(Period::Paused).is_ok());
    /// assert!(cfg.check_period(Period::every(Duration::from_secs(1))).is_ok());
    /// assert_eq!(
    ///     cfg.check_period(Period::every(Duration::ZERO)),
    ///     Err(ScheduleError::ZeroPeriod)
    /// );
    /// ```
    pub fn check_period(&self, period: Period) -> Result<Period, ScheduleError> {
        let Some(d) = period.as_duration() else {
            return Ok(period);
        };
        if d.is_zero() {
            return Err(ScheduleError::ZeroPeriod);
        }
        if d < self.min_period {
            return Err(ScheduleError::PeriodBelowMinimum {
                period: d,
                min: self.min_period,
            });
        }
        Ok(period)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `min_period = 1ms`
    /// - `max_timers = 0` (unlimited)
    /// - `missed_tick = MissedTick::Skip`
    /// - `immediate = false`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            min_period: Duration::from_millis(1),
            max_timers: 0,
            missed_tick: MissedTick::default(),
            immediate: false,
        }
    }
}
