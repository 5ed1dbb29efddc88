use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{config::Config, scheduler::Scheduler};
use crate::{
    driver::{TimerDriver, TokioDriver},
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Scheduler`] with optional parts.
pub struct SchedulerBuilder {
    cfg: Config,
    driver: Option<Arc<dyn TimerDriver>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            driver: None,
            subscribers: Vec::new(),
        }
    }

    /// Injects the timer driver.
    ///
    /// Defaults to [`TokioDriver::from_config`] when not set.
    pub fn with_driver(mut self, driver: Arc<dyn TimerDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (registrations, ticks, failures, ...)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the scheduler.
    ///
    /// With subscribers configured this spawns the subscriber workers and the
    /// bus listener, so it must be called from within a tokio runtime. Without
    /// subscribers nothing is spawned. Call [`Scheduler::shutdown`] to flush
    /// and stop the listener.
    pub fn build(self) -> Scheduler {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subscribers = self.subscribers.len();
        let token = CancellationToken::new();
        let listener = if self.subscribers.is_empty() {
            None
        } else {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            Some(spawn_listener(&bus, set, token.clone()))
        };

        let driver = self
            .driver
            .unwrap_or_else(|| Arc::new(TokioDriver::from_config(&self.cfg)));

        Scheduler::from_parts(self.cfg, driver, bus, subscribers, token, listener)
    }
}

/// Forwards bus events to the subscriber set until `token` is cancelled.
///
/// On cancellation the events already queued on the bus are still forwarded,
/// then the subscriber workers are drained and joined.
fn spawn_listener(bus: &Bus, set: SubscriberSet, token: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
            }
        }

        loop {
            match rx.try_recv() {
                Ok(ev) => set.emit(&ev),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        drop(rx);
        set.shutdown().await;
    })
}
