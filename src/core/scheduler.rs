//! # Scheduler: shared context for tasks.
//!
//! The [`Scheduler`] owns the configuration, the injected [`TimerDriver`], the
//! event [`Bus`] and the bus listener feeding the subscribers. Every task holds a clone of it and
//! goes through it for registrations and cancellations, so driver calls and the
//! events describing them are always emitted together.
//!
//! ## Architecture
//! ```text
//!   RepeatingTask ─┐                    ┌──► TimerDriver (Tokio / Manual)
//!   OneShotTask   ─┼──► Scheduler ──────┤
//!   TaskSupervisor─┘   (Arc<Inner>)     └──► Bus ──► listener ──► SubscriberSet
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tickvisor::{Config, ManualDriver, Scheduler};
//!
//! let driver = Arc::new(ManualDriver::new());
//! let sched = Scheduler::with_driver(Config::default(), driver.clone());
//!
//! let task = sched
//!     .repeating("heartbeat", Duration::from_millis(100), || Ok(()))
//!     .unwrap();
//! assert!(task.is_running());
//!
//! driver.advance(Duration::from_millis(300));
//! assert_eq!(task.ticks(), 3);
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::builder::SchedulerBuilder;
use super::config::Config;
use super::invoke::Ticker;
use crate::driver::{TimerDriver, TimerHandle, TimerKind};
use crate::error::{BehaviorError, ScheduleError};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{OneShotTask, Period, RepeatingTask, SupervisorOptions, TaskSupervisor, Timed};

struct Inner {
    cfg: Config,
    driver: Arc<dyn TimerDriver>,
    bus: Bus,
    subscribers: usize,
    shutdown: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Shared task context (cheap to clone).
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Starts building a scheduler.
    pub fn builder(cfg: Config) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    /// Builds a scheduler around `driver` with no subscribers.
    ///
    /// Does not need a tokio runtime.
    pub fn with_driver(cfg: Config, driver: Arc<dyn TimerDriver>) -> Self {
        SchedulerBuilder::new(cfg).with_driver(driver).build()
    }

    pub(crate) fn from_parts(
        cfg: Config,
        driver: Arc<dyn TimerDriver>,
        bus: Bus,
        subscribers: usize,
        shutdown: CancellationToken,
        listener: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                driver,
                bus,
                subscribers,
                shutdown,
                listener: Mutex::new(listener),
            }),
        }
    }

    /// Configuration this scheduler was built with.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// The injected timer driver.
    pub fn driver(&self) -> &Arc<dyn TimerDriver> {
        &self.inner.driver
    }

    /// The event bus.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    /// Creates a raw receiver for subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Number of subscribers fed by the listener.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers
    }

    /// Stops the bus listener after forwarding the events already published,
    /// then waits for every subscriber to process its queue.
    ///
    /// Timers are not touched. Events published afterwards still reach
    /// [`Scheduler::subscribe`] receivers but no subscriber. Idempotent.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let listener = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = listener {
            let _ = handle.await;
        }
    }

    /// Live registrations according to the driver.
    pub fn live_timers(&self) -> usize {
        self.inner.driver.live_timers()
    }

    /// Creates and starts a [`RepeatingTask`] (paused periods register nothing).
    pub fn repeating<F>(
        &self,
        name: impl Into<Arc<str>>,
        period: impl Into<Period>,
        behavior: F,
    ) -> Result<RepeatingTask, ScheduleError>
    where
        F: Fn() -> Result<(), BehaviorError> + Send + Sync + 'static,
    {
        RepeatingTask::new(self, name, period, behavior)
    }

    /// Creates and arms a [`OneShotTask`].
    pub fn one_shot<F>(
        &self,
        name: impl Into<Arc<str>>,
        delay: Duration,
        behavior: F,
    ) -> Result<OneShotTask, ScheduleError>
    where
        F: Fn() -> Result<(), BehaviorError> + Send + Sync + 'static,
    {
        OneShotTask::new(self, name, delay, behavior)
    }

    /// Wraps `task` in a supervisor using [`Config::immediate`].
    pub fn supervise<T: Timed>(&self, task: T) -> TaskSupervisor<T> {
        let options = SupervisorOptions {
            immediate: self.inner.cfg.immediate,
        };
        TaskSupervisor::new(self, task, options)
    }

    /// Publishes an event on the bus.
    pub(crate) fn publish(&self, ev: Event) {
        self.inner.bus.publish(ev);
    }

    /// Registers `ticker` with the driver and reports the outcome.
    pub(crate) fn register(&self, every: Duration, ticker: Ticker) -> Result<TimerHandle, ScheduleError> {
        let name = Arc::clone(&ticker.name);
        let kind = ticker.kind;
        let tick = ticker.into_tick_fn();

        let res = match kind {
            TimerKind::Repeating => self.inner.driver.register_repeating(every, tick),
            TimerKind::OneShot => self.inner.driver.register_once(every, tick),
        };

        match res {
            Ok(handle) => {
                self.publish(
                    Event::new(EventKind::TimerRegistered)
                        .with_task(name)
                        .with_handle(handle)
                        .with_duration(every),
                );
                Ok(handle)
            }
            Err(e) => {
                self.publish(
                    Event::new(EventKind::RegistrationFailed)
                        .with_task(name)
                        .with_timer(kind)
                        .with_reason(e.as_label()),
                );
                Err(ScheduleError::Registration(e))
            }
        }
    }

    /// Cancels `handle` with the driver and reports it.
    pub(crate) fn cancel(&self, name: &Arc<str>, handle: TimerHandle) {
        self.inner.driver.cancel(handle);
        self.publish(
            Event::new(EventKind::TimerCancelled)
                .with_task(Arc::clone(name))
                .with_handle(handle),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverCall, ManualDriver};

    fn manual() -> (Arc<ManualDriver>, Scheduler) {
        let driver = Arc::new(ManualDriver::new());
        let sched = Scheduler::with_driver(Config::default(), driver.clone());
        (driver, sched)
    }

    #[test]
    fn test_register_publishes_handle() {
        let (driver, sched) = manual();
        let mut rx = sched.subscribe();

        let task = sched
            .one_shot("once", Duration::from_millis(20), || Ok(()))
            .unwrap();
        let handle = task.handle().unwrap();

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::TimerRegistered);
        assert_eq!(ev.handle, Some(handle.id()));
        assert_eq!(ev.timer, Some(TimerKind::OneShot));
        assert_eq!(ev.period_ms, Some(20));
        assert_eq!(
            driver.calls(),
            vec![DriverCall::RegisterOnce {
                handle,
                delay: Duration::from_millis(20)
            }]
        );
    }

    #[test]
    fn test_refused_registration_is_reported() {
        let (driver, sched) = manual();
        driver.set_limit(Some(0));
        let mut rx = sched.subscribe();

        let err = sched
            .repeating("r", Duration::from_millis(10), || Ok(()))
            .err()
            .unwrap();

        assert!(err.is_registration());
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::RegistrationFailed);
        assert_eq!(ev.reason.as_deref(), Some("driver_exhausted"));
        assert_eq!(sched.live_timers(), 0);
    }

    #[test]
    fn test_failures_without_subscribers_keep_timer_alive() {
        let (driver, sched) = manual();
        assert_eq!(sched.bus().receiver_count(), 0);

        let task = sched
            .repeating("db", Duration::from_millis(10), || {
                Err(BehaviorError::fail("db down"))
            })
            .unwrap();
        driver.advance(Duration::from_millis(30));

        assert_eq!(task.ticks(), 3);
        assert!(task.is_running());
        assert_eq!(sched.live_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_driver_runs_latest_behavior() {
        use std::sync::atomic::{AtomicU64, Ordering};

        let sched = Scheduler::builder(Config::default()).build();
        let hits = Arc::new(AtomicU64::new(0));

        let h = Arc::clone(&hits);
        let mut task = sched
            .repeating("tokio", Duration::from_millis(100), move || {
                h.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        let h = Arc::clone(&hits);
        task.set_behavior(move || {
            h.fetch_add(10, Ordering::SeqCst);
            Ok(())
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 12);

        task.stop();
        assert_eq!(sched.live_timers(), 0);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_supervise_uses_config_default() {
        let driver = Arc::new(ManualDriver::new());
        let cfg = Config {
            immediate: true,
            ..Config::default()
        };
        let sched = Scheduler::with_driver(cfg, driver);
        let task = RepeatingTask::idle(&sched, "r", Duration::from_secs(1), || Ok(())).unwrap();

        let sup = sched.supervise(task);
        assert!(sup.options().immediate);
        assert_eq!(sched.subscriber_count(), 0);
    }
}
