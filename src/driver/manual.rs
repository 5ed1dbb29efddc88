//! # Deterministic timer driver for tests.
//!
//! [`ManualDriver`] keeps a virtual clock that only moves when
//! [`advance`](ManualDriver::advance) is called. Due timers fire in deadline
//! order (ties broken by registration order) on the calling thread, so tests
//! can reason about ticks without sleeping.
//!
//! Every call made by a task is appended to a log of [`DriverCall`]s, which lets
//! tests assert *ordering* (for example that a cancel precedes the next
//! registration) as well as counts.
//!
//! ## Rules
//! - The internal lock is released before a tick runs; ticks may freely
//!   register, cancel or advance nothing (re-entrant `advance` is not supported).
//! - A repeating timer registered at `t` fires at `t + p`, `t + 2p`, ...
//! - A one-shot is removed before its tick runs.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{TickFn, TimerDriver, TimerHandle, TimerKind};
use crate::error::DriverError;

/// One recorded call into the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    /// `register_repeating` succeeded.
    RegisterRepeating {
        /// Returned handle.
        handle: TimerHandle,
        /// Requested period.
        period: Duration,
    },
    /// `register_once` succeeded.
    RegisterOnce {
        /// Returned handle.
        handle: TimerHandle,
        /// Requested delay.
        delay: Duration,
    },
    /// `cancel` was called (recorded even for unknown handles).
    Cancel {
        /// Handle passed in.
        handle: TimerHandle,
    },
}

struct ManualTimer {
    due: Duration,
    every: Option<Duration>,
    tick: TickFn,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    limit: Option<usize>,
    timers: BTreeMap<u64, ManualTimer>,
    calls: Vec<DriverCall>,
}

/// Virtual-clock [`TimerDriver`].
#[derive(Default)]
pub struct ManualDriver {
    state: Mutex<ManualState>,
}

impl ManualDriver {
    /// Creates a driver at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of live registrations (`None` = unlimited).
    pub fn set_limit(&self, limit: Option<usize>) {
        self.lock().limit = limit;
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Copy of the call log.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.lock().calls.clone()
    }

    /// Number of successful registrations (both kinds) so far.
    pub fn registrations(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| !matches!(c, DriverCall::Cancel { .. }))
            .count()
    }

    /// Moves the clock forward by `by`, firing every timer that comes due.
    ///
    /// Returns the number of ticks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut fired = 0;

        while let Some(tick) = self.pop_due(target) {
            tick();
            fired += 1;
        }

        let mut st = self.lock();
        if st.now < target {
            st.now = target;
        }
        fired
    }

    /// Takes the earliest timer due at or before `target`, moving the clock to it.
    fn pop_due(&self, target: Duration) -> Option<TickFn> {
        let mut st = self.lock();
        let id = st
            .timers
            .iter()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(id, t)| (t.due, **id))
            .map(|(id, _)| *id)?;

        let timer = st.timers.remove(&id)?;
        st.now = timer.due;
        let tick = TickFn::clone(&timer.tick);
        if let Some(every) = timer.every {
            st.timers.insert(
                id,
                ManualTimer {
                    due: timer.due + every,
                    ..timer
                },
            );
        }
        Some(tick)
    }

    fn register(
        &self,
        kind: TimerKind,
        after: Duration,
        every: Option<Duration>,
        tick: TickFn,
    ) -> Result<TimerHandle, DriverError> {
        let mut st = self.lock();
        if let Some(limit) = st.limit {
            if st.timers.len() >= limit {
                return Err(DriverError::Exhausted { limit });
            }
        }

        st.next_id += 1;
        let handle = TimerHandle::new(st.next_id, kind);
        let due = st.now + after;
        st.timers.insert(handle.id(), ManualTimer { due, every, tick });
        st.calls.push(match kind {
            TimerKind::Repeating => DriverCall::RegisterRepeating {
                handle,
                period: after,
            },
            TimerKind::OneShot => DriverCall::RegisterOnce {
                handle,
                delay: after,
            },
        });
        Ok(handle)
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TimerDriver for ManualDriver {
    fn register_repeating(
        &self,
        period: Duration,
        tick: TickFn,
    ) -> Result<TimerHandle, DriverError> {
        if period.is_zero() {
            return Err(DriverError::ZeroPeriod);
        }
        self.register(TimerKind::Repeating, period, Some(period), tick)
    }

    fn register_once(&self, delay: Duration, tick: TickFn) -> Result<TimerHandle, DriverError> {
        self.register(TimerKind::OneShot, delay, None, tick)
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut st = self.lock();
        st.timers.remove(&handle.id());
        st.calls.push(DriverCall::Cancel { handle });
    }

    fn live_timers(&self) -> usize {
        self.lock().timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    fn recorder() -> (Arc<StdMutex<Vec<&'static str>>>, impl Fn(&'static str) -> TickFn) {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let make = move |label: &'static str| -> TickFn {
            let l = Arc::clone(&l);
            Arc::new(move || l.lock().unwrap().push(label))
        };
        (log, make)
    }

    #[test]
    fn test_repeating_fires_on_each_period() {
        let driver = ManualDriver::new();
        let (log, make) = recorder();

        driver
            .register_repeating(Duration::from_millis(100), make("a"))
            .unwrap();

        assert_eq!(driver.advance(Duration::from_millis(99)), 0);
        assert_eq!(driver.advance(Duration::from_millis(1)), 1);
        assert_eq!(driver.advance(Duration::from_millis(250)), 2);
        assert_eq!(driver.now(), Duration::from_millis(350));
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let driver = ManualDriver::new();
        let (log, make) = recorder();

        driver
            .register_repeating(Duration::from_millis(30), make("every-30"))
            .unwrap();
        driver
            .register_once(Duration::from_millis(45), make("once-45"))
            .unwrap();

        driver.advance(Duration::from_millis(100));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["every-30", "once-45", "every-30", "every-30"]
        );
        assert_eq!(driver.live_timers(), 1);
    }

    #[test]
    fn test_cancel_is_logged_and_stops_firing() {
        let driver = ManualDriver::new();
        let (log, make) = recorder();

        let h = driver
            .register_repeating(Duration::from_millis(10), make("a"))
            .unwrap();
        driver.cancel(h);
        driver.advance(Duration::from_millis(100));

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::RegisterRepeating {
                    handle: h,
                    period: Duration::from_millis(10)
                },
                DriverCall::Cancel { handle: h },
            ]
        );
        assert_eq!(driver.registrations(), 1);
    }

    #[test]
    fn test_limit_rejects_registration() {
        let driver = ManualDriver::new();
        let (_, make) = recorder();
        driver.set_limit(Some(1));

        driver
            .register_once(Duration::from_millis(10), make("a"))
            .unwrap();
        assert_eq!(
            driver.register_once(Duration::from_millis(10), make("b")),
            Err(DriverError::Exhausted { limit: 1 })
        );

        driver.advance(Duration::from_millis(10));
        assert!(driver.register_once(Duration::from_millis(10), make("c")).is_ok());
    }

    #[test]
    fn test_tick_may_cancel_other_timers() {
        let driver = Arc::new(ManualDriver::new());
        let (log, make) = recorder();

        let victim = driver
            .register_once(Duration::from_millis(20), make("victim"))
            .unwrap();
        let d = Arc::clone(&driver);
        driver
            .register_once(
                Duration::from_millis(10),
                Arc::new(move || d.cancel(victim)),
            )
            .unwrap();

        assert_eq!(driver.advance(Duration::from_millis(50)), 1);
        assert!(log.lock().unwrap().is_empty());
    }
}
