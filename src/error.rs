//! Error types used by timers, drivers and behaviors.
//!
//! This module defines three error enums:
//!
//! - [`ScheduleError`]: rejected construction or reconfiguration of a task.
//! - [`DriverError`]: the timer driver refused a registration.
//! - [`BehaviorError`]: returned by a behavior when a tick fails.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logs/metrics.
//! Behavior failures never travel back to the caller: they are published on the
//! event bus as [`EventKind::BehaviorFailed`](crate::EventKind::BehaviorFailed).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced while creating or reconfiguring a task.
///
/// Validation errors are raised **before** any task state is touched, so a
/// rejected call leaves the task exactly as it was.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A signed millisecond value was negative.
    #[error("negative duration: {millis}ms")]
    NegativeDuration {
        /// The rejected value.
        millis: i64,
    },

    /// Repeating timers cannot run with a zero period.
    #[error("repeating period must be greater than zero")]
    ZeroPeriod,

    /// The period is shorter than [`Config::min_period`](crate::Config::min_period).
    #[error("period {period:?} is below the configured minimum {min:?}")]
    PeriodBelowMinimum {
        /// The requested period.
        period: Duration,
        /// The configured floor.
        min: Duration,
    },

    /// The timer driver refused to register the timer.
    #[error("timer registration failed: {0}")]
    Registration(#[from] DriverError),
}

impl ScheduleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::ScheduleError;
    ///
    /// let err = ScheduleError::NegativeDuration { millis: -5 };
    /// assert_eq!(err.as_label(), "schedule_negative_duration");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScheduleError::NegativeDuration { .. } => "schedule_negative_duration",
            ScheduleError::ZeroPeriod => "schedule_zero_period",
            ScheduleError::PeriodBelowMinimum { .. } => "schedule_period_below_minimum",
            ScheduleError::Registration(_) => "schedule_registration_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ScheduleError::NegativeDuration { millis } => format!("negative: {millis}ms"),
            ScheduleError::ZeroPeriod => "zero period".to_string(),
            ScheduleError::PeriodBelowMinimum { period, min } => {
                format!("period {period:?} < min {min:?}")
            }
            ScheduleError::Registration(e) => format!("driver: {}", e.as_message()),
        }
    }

    /// Indicates whether the error came from the driver rather than from validation.
    ///
    /// Driver errors may go away (a slot frees up, a runtime appears); validation
    /// errors will not.
    pub fn is_registration(&self) -> bool {
        matches!(self, ScheduleError::Registration(_))
    }
}

/// # Errors produced by a [`TimerDriver`](crate::TimerDriver).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The driver already holds its maximum number of live timers.
    #[error("timer limit {limit} reached")]
    Exhausted {
        /// The configured limit.
        limit: usize,
    },

    /// No tokio runtime is available to drive the timer.
    #[error("no tokio runtime available")]
    NoRuntime,

    /// Repeating registrations need a non-zero period.
    #[error("zero period")]
    ZeroPeriod,
}

impl DriverError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DriverError::Exhausted { .. } => "driver_exhausted",
            DriverError::NoRuntime => "driver_no_runtime",
            DriverError::ZeroPeriod => "driver_zero_period",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DriverError::Exhausted { limit } => format!("exhausted: limit={limit}"),
            DriverError::NoRuntime => "no runtime".to_string(),
            DriverError::ZeroPeriod => "zero period".to_string(),
        }
    }
}

/// # Error returned by a behavior.
///
/// Returning an error does not stop the timer; the failure is reported on the
/// event bus and the next tick runs as scheduled.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BehaviorError {
    /// The tick failed.
    #[error("behavior failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl BehaviorError {
    /// Shorthand for [`BehaviorError::Fail`].
    ///
    /// # Example
    /// ```
    /// use tickvisor::BehaviorError;
    ///
    /// let err = BehaviorError::fail("disk full");
    /// assert_eq!(err.as_message(), "error: disk full");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        BehaviorError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BehaviorError::Fail { .. } => "behavior_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BehaviorError::Fail { error } => format!("error: {error}"),
        }
    }
}
