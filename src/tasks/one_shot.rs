//! # OneShotTask: timeout timer with a swappable behavior.
//!
//! Registers a single-fire timer with the driver. Like
//! [`RepeatingTask`](crate::RepeatingTask) the tick reads the behavior through a
//! [`LatestCell`], so a swap before the deadline changes what runs.
//!
//! Once the timer fires the task invalidates itself: [`is_pending`](OneShotTask::is_pending)
//! turns false, [`handle`](OneShotTask::handle) returns `None` and
//! [`cancel`](OneShotTask::cancel) no longer reaches the driver. Arming again
//! (directly or through a supervisor) registers a fresh timeout.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::core::Scheduler;
use crate::core::invoke::{Ticker, run_behavior};
use crate::driver::{TimerHandle, TimerKind};
use crate::error::{BehaviorError, ScheduleError};
use crate::events::{Event, EventKind};
use crate::tasks::{BehaviorRef, LatestCell, Timed};

/// Single-fire timer invoking the latest behavior.
pub struct OneShotTask {
    name: Arc<str>,
    sched: Scheduler,
    behavior: LatestCell<BehaviorRef>,
    delay: Duration,
    handle: Option<TimerHandle>,
    /// Flag of the current registration; replaced on every arm.
    fired: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
}

impl OneShotTask {
    /// Creates the task and arms it.
    pub fn new<F>(
        sched: &Scheduler,
        name: impl Into<Arc<str>>,
        delay: Duration,
        behavior: F,
    ) -> Result<Self, ScheduleError>
    where
        F: Fn() -> Result<(), BehaviorError> + Send + Sync + 'static,
    {
        let mut task = Self::idle(sched, name, delay, behavior);
        task.arm()?;
        Ok(task)
    }

    /// Creates the task without arming it.
    pub fn idle<F>(sched: &Scheduler, name: impl Into<Arc<str>>, delay: Duration, behavior: F) -> Self
    where
        F: Fn() -> Result<(), BehaviorError> + Send + Sync + 'static,
    {
        let behavior: BehaviorRef = Arc::new(behavior);
        Self {
            name: name.into(),
            sched: sched.clone(),
            behavior: LatestCell::new(behavior),
            delay,
            handle: None,
            fired: Arc::new(AtomicBool::new(false)),
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delay applied on every arm.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a registration is live and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.handle.is_some() && !self.fired.load(Ordering::Acquire)
    }

    /// Whether the latest registration has fired.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Live handle; `None` once fired or cancelled.
    pub fn handle(&self) -> Option<TimerHandle> {
        if self.is_pending() { self.handle } else { None }
    }

    /// Times the timeout fired across all arms.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Replaces the behavior. After firing this has no observable effect until re-armed.
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

    /// Cancels the pending timeout. Idempotent; a fired timeout is not sent to the driver.
    pub fn cancel(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        if !self.fired.load(Ordering::Acquire) {
            self.sched.cancel(&self.name, handle);
        }
    }
}

impl Timed for OneShotTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn arm(&mut self) -> Result<(), ScheduleError> {
        if self.is_pending() {
            return Ok(());
        }
        // Fired registration: the handle is already dead on the driver side.
        self.handle = None;

        let fired = Arc::new(AtomicBool::new(false));
        let ticker = Ticker {
            bus: self.sched.bus().clone(),
            name: Arc::clone(&self.name),
            kind: TimerKind::OneShot,
            behavior: self.behavior.clone(),
            ticks: Arc::clone(&self.ticks),
            fired: Some(Arc::clone(&fired)),
        };
        let handle = self.sched.register(self.delay, ticker)?;
        self.fired = fired;
        self.handle = Some(handle);
        Ok(())
    }

    fn disarm(&mut self) {
        self.cancel();
    }

    fn is_armed(&self) -> bool {
        self.is_pending()
    }

    fn invoke_now(&self) {
        self.sched
            .publish(Event::new(EventKind::ImmediateInvoked).with_task(Arc::clone(&self.name)));
        run_behavior(self.sched.bus(), &self.name, &self.behavior.get(), None);
    }
}

impl Drop for OneShotTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for OneShotTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneShotTask")
            .field("name", &self.name)
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .field("fired", &self.has_fired())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::core::Config;
    use crate::driver::{DriverCall, ManualDriver, TimerDriver};

    fn manual() -> (Arc<ManualDriver>, Scheduler) {
        let driver = Arc::new(ManualDriver::new());
        let sched = Scheduler::with_driver(Config::default(), driver.clone());
        (driver, sched)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn counter() -> (Arc<AtomicU64>, impl Fn() -> Result<(), BehaviorError> + Send + Sync + 'static) {
        let hits = Arc::new(AtomicU64::new(0));
        let h = Arc::clone(&hits);
        (hits, move || {
            h.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_fires_exactly_once() {
        let (driver, sched) = manual();
        let (hits, b) = counter();
        let task = OneShotTask::new(&sched, "timeout", ms(200), b).unwrap();

        assert!(task.is_pending());
        driver.advance(ms(199));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        driver.advance(ms(1));
        driver.advance(ms(10_000));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!task.is_pending());
        assert!(task.has_fired());
        assert_eq!(task.handle(), None);
        assert_eq!(driver.live_timers(), 0);
    }

    #[test]
    fn test_cancel_after_fire_skips_driver() {
        let (driver, sched) = manual();
        let mut task = OneShotTask::new(&sched, "t", ms(10), || Ok(())).unwrap();
        driver.advance(ms(10));

        task.cancel();
        task.cancel();

        let cancels = driver
            .calls()
            .iter()
            .filter(|c| matches!(c, DriverCall::Cancel { .. }))
            .count();
        assert_eq!(cancels, 0);
    }

    #[test]
    fn test_cancel_before_fire_prevents_tick() {
        let (driver, sched) = manual();
        let (hits, b) = counter();
        let mut task = OneShotTask::new(&sched, "t", ms(10), b).unwrap();
        let handle = task.handle().unwrap();

        task.cancel();
        task.cancel();
        driver.advance(ms(100));

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::RegisterOnce { handle, delay: ms(10) },
                DriverCall::Cancel { handle },
            ]
        );
    }

    #[test]
    fn test_swap_before_deadline_runs_new_behavior() {
        let (driver, sched) = manual();
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let task = OneShotTask::new(&sched, "t", ms(50), move || {
            l.lock().unwrap().push("old");
            Ok(())
        })
        .unwrap();

        let l = Arc::clone(&log);
        task.set_behavior(move || {
            l.lock().unwrap().push("new");
            Ok(())
        });
        driver.advance(ms(50));

        assert_eq!(*log.lock().unwrap(), vec!["new"]);
    }

    #[test]
    fn test_swap_after_fire_runs_nothing() {
        let (driver, sched) = manual();
        let (first, b) = counter();
        let task = OneShotTask::new(&sched, "t", ms(20), b).unwrap();
        driver.advance(ms(20));
        assert_eq!(first.load(Ordering::SeqCst), 1);

        let (second, b) = counter();
        task.set_behavior(b);
        driver.advance(ms(1_000));

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(task.ticks(), 1);
        assert_eq!(driver.registrations(), 1);
        assert_eq!(driver.live_timers(), 0);
    }

    #[test]
    fn test_rearm_after_fire_registers_fresh_timeout() {
        let (driver, sched) = manual();
        let (hits, b) = counter();
        let mut task = OneShotTask::new(&sched, "t", ms(10), b).unwrap();
        let first = task.handle().unwrap();
        driver.advance(ms(10));

        task.arm().unwrap();
        assert!(task.is_pending());
        assert!(!task.has_fired());
        assert_ne!(task.handle(), Some(first));

        driver.advance(ms(10));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(task.ticks(), 2);
    }

    #[test]
    fn test_arm_while_pending_is_noop() {
        let (driver, sched) = manual();
        let mut task = OneShotTask::new(&sched, "t", ms(10), || Ok(())).unwrap();

        task.arm().unwrap();
        task.arm().unwrap();
        assert_eq!(driver.registrations(), 1);
    }

    #[test]
    fn test_idle_registers_nothing() {
        let (driver, sched) = manual();
        let task = OneShotTask::idle(&sched, "t", ms(10), || Ok(()));

        assert!(!task.is_pending());
        assert!(!task.has_fired());
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_drop_cancels_pending() {
        let (driver, sched) = manual();
        {
            let _task = OneShotTask::new(&sched, "t", ms(10), || Ok(())).unwrap();
            assert_eq!(driver.live_timers(), 1);
        }
        assert_eq!(driver.live_timers(), 0);
    }

    #[test]
    fn test_refused_registration_leaves_idle() {
        let (driver, sched) = manual();
        driver.set_limit(Some(0));

        let mut task = OneShotTask::idle(&sched, "t", ms(10), || Ok(()));
        assert!(task.arm().unwrap_err().is_registration());
        assert!(!task.is_pending());
        assert_eq!(task.handle(), None);
    }
}
