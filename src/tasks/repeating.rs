//! # RepeatingTask: interval timer with a swappable behavior.
//!
//! A repeating task registers **one** interval with the driver and invokes the
//! behavior through a [`LatestCell`], so [`set_behavior`](RepeatingTask::set_behavior)
//! never touches the timer and [`set_period`](RepeatingTask::set_period) never
//! touches the behavior.
//!
//! ## State machine
//! ```text
//!            set_period(Every(p))                set_period(Every(q)), q != p
//!   Paused ───────────────────────► Running ──────────────────────────────┐
//!     ▲                              │   ▲     (cancel old, register new)  │
//!     │  set_period(Paused) / stop() │   └─────────────────────────────────┘
//!     └──────────────────────────────┘
//! ```
//!
//! ## Rules
//! - At most one live handle: the old handle is cancelled **before** the new
//!   registration, and the handle field is the only place a handle is kept
//! - `set_period` validates before mutating; a rejected period changes nothing
//! - `set_period` with the already applied period is a no-op
//! - A registration failure leaves the task `Paused` without a handle
//! - Dropping the task cancels its timer

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::core::Scheduler;
use crate::core::invoke::{Ticker, run_behavior};
use crate::driver::{TimerHandle, TimerKind};
use crate::error::{BehaviorError, ScheduleError};
use crate::events::{Event, EventKind};
use crate::tasks::{BehaviorRef, LatestCell, Period, Timed};

/// Observable state of a [`RepeatingTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// No timer registered.
    Paused,
    /// One timer registered.
    Running,
}

/// Interval timer invoking the latest behavior on every tick.
pub struct RepeatingTask {
    name: Arc<str>,
    sched: Scheduler,
    behavior: LatestCell<BehaviorRef>,
    period: Period,
    handle: Option<TimerHandle>,
    ticks: Arc<AtomicU64>,
}

impl RepeatingTask {
    /// Creates the task and registers its timer unless `period` is paused.
    pub fn new<F>(
        sched: &Scheduler,
        name: impl Into<Arc<str>>,
        period: impl Into<Period>,
        behavior: F,
    ) -> Result<Self, ScheduleError>
    where
        F: Fn() -> Result<(), BehaviorError> + Send + Sync + 'static,
    {
        let mut task = Self::idle(sched, name, period, behavior)?;
        task.install()?;
        Ok(task)
    }

    /// Creates the task without registering anything.
    ///
    /// The period is validated and remembered; the first [`Timed::arm`] (or a
    /// supervisor's `start`) registers it.
    pub fn idle<F>(
        sched: &Scheduler,
        name: impl Into<Arc<str>>,
        period: impl Into<Period>,
        behavior: F,
    ) -> Result<Self, ScheduleError>
    where
        F: Fn() -> Result<(), BehaviorError> + Send + Sync + 'static,
    {
        let period = sched.config().check_period(period.into())?;
        let behavior: BehaviorRef = Arc::new(behavior);
        Ok(Self {
            name: name.into(),
            sched: sched.clone(),
            behavior: LatestCell::new(behavior),
            period,
            handle: None,
            ticks: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Desired period (the applied one while running).
    pub fn period(&self) -> Period {
        self.period
    }

    /// Whether a timer is registered.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Current state.
    pub fn state(&self) -> TaskState {
        if self.handle.is_some() {
            TaskState::Running
        } else {
            TaskState::Paused
        }
    }

    /// Live driver handle, if any.
    pub fn handle(&self) -> Option<TimerHandle> {
        self.handle
    }

    /// Ticks fired so far (immediate invocations excluded).
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Replaces the behavior; the next tick runs it.
    ///
    /// The timer and the period are left untouched. Safe to call from inside
    /// the running behavior.
    pub fn set_behavior<F>(&self, behavior: F)
    where
        F: Fn() -> Result<(), BehaviorError> + Send + Sync + 'static,
    {
        self.set_behavior_ref(Arc::new(behavior));
    }

    /// Replaces the behavior with an already shared one.
    pub fn set_behavior_ref(&self, behavior: BehaviorRef) {
        self.behavior.set(behavior);
        self.sched
            .publish(Event::new(EventKind::BehaviorReplaced).with_task(Arc::clone(&self.name)));
    }

    /// Applies a new period: cancel the current timer, register a new one unless paused.
    ///
    /// A no-op when `period` is already applied (same period, matching state).
    pub fn set_period(&mut self, period: impl Into<Period>) -> Result<(), ScheduleError> {
        let period = self.sched.config().check_period(period.into())?;
        let applied = self.handle.is_some() == !period.is_paused();
        if period == self.period && applied {
            return Ok(());
        }

        self.period = period;
        self.teardown();
        self.sched.publish(
            Event::new(EventKind::PeriodChanged)
                .with_task(Arc::clone(&self.name))
                .with_period(period),
        );
        self.install()
    }

    /// Shorthand for `set_period(Period::every(d))`.
    pub fn set_every(&mut self, d: Duration) -> Result<(), ScheduleError> {
        self.set_period(Period::every(d))
    }

    /// Cancels the timer. Idempotent.
    pub fn stop(&mut self) {
        self.teardown();
    }

    /// Registers the timer for the current period if none is live.
    fn install(&mut self) -> Result<(), ScheduleError> {
        let Some(every) = self.period.as_duration() else {
            return Ok(());
        };
        if self.handle.is_some() {
            return Ok(());
        }

        let ticker = Ticker {
            bus: self.sched.bus().clone(),
            name: Arc::clone(&self.name),
            kind: TimerKind::Repeating,
            behavior: self.behavior.clone(),
            ticks: Arc::clone(&self.ticks),
            fired: None,
        };
        self.handle = Some(self.sched.register(every, ticker)?);
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.sched.cancel(&self.name, handle);
        }
    }
}

impl Timed for RepeatingTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn arm(&mut self) -> Result<(), ScheduleError> {
        self.install()
    }

    fn disarm(&mut self) {
        self.teardown();
    }

    fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    fn invoke_now(&self) {
        self.sched
            .publish(Event::new(EventKind::ImmediateInvoked).with_task(Arc::clone(&self.name)));
        run_behavior(self.sched.bus(), &self.name, &self.behavior.get(), None);
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for RepeatingTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepeatingTask")
            .field("name", &self.name)
            .field("period", &self.period)
            .field("handle", &self.handle)
            .field("ticks", &self.ticks())
            .finish()
    }
}
