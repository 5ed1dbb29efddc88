//! # Repeating period with a paused sentinel.
//!
//! A [`Period`] is either [`Period::Paused`] (no timer registered, task inert)
//! or [`Period::Every`] with a positive duration. Callers holding signed
//! millisecond values (config, wire formats) go through
//! [`Period::from_millis`] / [`checked_millis`], which reject negatives before
//! anything is scheduled.

use std::time::Duration;

use crate::error::ScheduleError;

/// Period of a repeating task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Period {
    /// No timer is registered; the task never ticks.
    #[default]
    Paused,
    /// Tick every `Duration`.
    Every(Duration),
}

impl Period {
    /// Shorthand for [`Period::Every`].
    #[inline]
    pub fn every(d: Duration) -> Self {
        Period::Every(d)
    }

    /// True for the paused sentinel.
    #[inline]
    pub fn is_paused(&self) -> bool {
        matches!(self, Period::Paused)
    }

    /// The duration, or `None` when paused.
    #[inline]
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Period::Paused => None,
            Period::Every(d) => Some(*d),
        }
    }

    /// Builds a period from signed milliseconds; `None` means paused.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use tickvisor::{Period, ScheduleError};
    ///
    /// assert_eq!(Period::from_millis(None), Ok(Period::Paused));
    /// assert_eq!(Period::from_millis(Some(250)), Ok(Period::every(Duration::from_millis(250))));
    /// assert_eq!(
    ///     Period::from_millis(Some(-1)),
    ///     Err(ScheduleError::NegativeDuration { millis: -1 })
    /// );
    /// ```
    pub fn from_millis(millis: Option<i64>) -> Result<Self, ScheduleError> {
        match millis {
            None => Ok(Period::Paused),
            Some(ms) => checked_millis(ms).map(Period::Every),
        }
    }
}

impl From<Duration> for Period {
    fn from(d: Duration) -> Self {
        Period::Every(d)
    }
}

impl From<Option<Duration>> for Period {
    fn from(d: Option<Duration>) -> Self {
        d.map_or(Period::Paused, Period::Every)
    }
}

/// Converts signed milliseconds into a [`Duration`], rejecting negatives.
pub fn checked_millis(millis: i64) -> Result<Duration, ScheduleError> {
    u64::try_from(millis)
        .map(Duration::from_millis)
        .map_err(|_| ScheduleError::NegativeDuration { millis })
}
