//! # Tokio-backed timer driver.
//!
//! Every registration becomes one spawned tokio task that owns its own clock
//! (`interval_at` for repeating timers, `sleep_until` for one-shots) and exits
//! when its [`CancellationToken`] is cancelled.
//!
//! ## Architecture
//! ```text
//! register_*() ──► admit() ──► live: HashMap<id, CancellationToken>
//!                     │
//!                     └──► rt.spawn(loop {
//!                              select! {
//!                                  biased;
//!                                  token.cancelled() => break,
//!                                  interval.tick()   => tick(),
//!                              }
//!                          })
//!
//! cancel(handle) ──► live.remove(id) ──► token.cancel()
//! ```
//!
//! ## Rules
//! - The runtime is resolved **at registration time** (`Handle::try_current`);
//!   constructing the driver does not need one.
//! - The first repeating tick fires one full period after registration.
//! - A one-shot removes itself from `live` before invoking the tick; if `cancel`
//!   got there first, the tick is skipped.
//! - Dropping the driver cancels all of its registrations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{TickFn, TimerDriver, TimerHandle, TimerKind};
use crate::core::{Config, MissedTick};
use crate::error::DriverError;

type LiveMap = Arc<Mutex<HashMap<u64, CancellationToken>>>;

/// Production [`TimerDriver`] running each registration as a tokio task.
pub struct TokioDriver {
    next_id: AtomicU64,
    live: LiveMap,
    limit: Option<usize>,
    missed_tick: MissedTickBehavior,
}

impl TokioDriver {
    /// Creates a driver with no timer limit that skips missed ticks.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            live: Arc::default(),
            limit: None,
            missed_tick: MissedTickBehavior::Skip,
        }
    }

    /// Creates a driver using [`Config::timer_limit`] and [`Config::missed_tick`].
    pub fn from_config(cfg: &Config) -> Self {
        Self::new()
            .with_limit(cfg.timer_limit())
            .with_missed_tick(cfg.missed_tick)
    }

    /// Caps the number of live registrations (`None` = unlimited).
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Sets how repeating timers catch up after a stall.
    pub fn with_missed_tick(mut self, missed: MissedTick) -> Self {
        self.missed_tick = missed.into();
        self
    }

    /// Resolves the runtime, enforces the limit and records a new live token.
    fn admit(&self, kind: TimerKind) -> Result<(Handle, TimerHandle, CancellationToken), DriverError> {
        let rt = Handle::try_current().map_err(|_| DriverError::NoRuntime)?;

        let mut live = lock(&self.live);
        if let Some(limit) = self.limit {
            if live.len() >= limit {
                return Err(DriverError::Exhausted { limit });
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        live.insert(id, token.clone());
        Ok((rt, TimerHandle::new(id, kind), token))
    }
}

impl Default for TokioDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerDriver for TokioDriver {
    fn register_repeating(
        &self,
        period: Duration,
        tick: TickFn,
    ) -> Result<TimerHandle, DriverError> {
        if period.is_zero() {
            return Err(DriverError::ZeroPeriod);
        }
        let (rt, handle, token) = self.admit(TimerKind::Repeating)?;
        let missed = self.missed_tick;
        let start = Instant::now() + period;

        rt.spawn(async move {
            let mut interval = time::interval_at(start, period);
            interval.set_missed_tick_behavior(missed);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if !token.is_cancelled() {
                            tick();
                        }
                    }
                }
            }
        });
        Ok(handle)
    }

    fn register_once(&self, delay: Duration, tick: TickFn) -> Result<TimerHandle, DriverError> {
        let (rt, handle, token) = self.admit(TimerKind::OneShot)?;
        let live = Arc::clone(&self.live);
        let deadline = Instant::now() + delay;

        rt.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = time::sleep_until(deadline) => {
                    let still_live = lock(&live).remove(&handle.id()).is_some();
                    if still_live {
                        tick();
                    }
                }
            }
        });
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) {
        let token = lock(&self.live).remove(&handle.id());
        if let Some(token) = token {
            token.cancel();
        }
    }

    fn live_timers(&self) -> usize {
        lock(&self.live).len()
    }
}

impl Drop for TokioDriver {
    fn drop(&mut self) {
        for (_, token) in lock(&self.live).drain() {
            token.cancel();
        }
    }
}

fn lock(live: &Mutex<HashMap<u64, CancellationToken>>) -> MutexGuard<'_, HashMap<u64, CancellationToken>> {
    live.lock().unwrap_or_else(PoisonError::into_inner)
}
