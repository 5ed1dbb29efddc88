//! # LiveTracker: live timer handles per task
//!
//! Maintains, per task name, the set of driver handles that may still fire, by
//! listening to [`EventKind::TimerRegistered`], [`EventKind::TimerCancelled`]
//! and one-shot [`EventKind::TickFired`].
//!
//! ## Why?
//! A healthy task holds at most one live handle. Tests and dashboards can check
//! [`live_count`](LiveTracker::live_count) to see that a period change or a
//! supervisor reset never left two timers behind.
//!
//! ## Stale events
//! Ticks publish from driver threads, so events for one task can reach the
//! tracker out of order. Every entry remembers the highest `seq` applied for
//! its task; anything older is ignored.
//!
//! ## Internal scheme
//! ```text
//! update(ev):
//!   ├─ ev.seq <= last_seq[task]              => ignore (stale)
//!   ├─ TimerRegistered { handle, timer }     => insert(handle)
//!   ├─ TimerCancelled  { handle }            => remove(handle)
//!   ├─ TickFired       { timer: OneShot }    => remove all one-shot handles
//!   └─ otherwise                             => ignore
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::driver::TimerKind;
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

#[derive(Default)]
struct Entry {
    last_seq: u64,
    handles: BTreeMap<u64, TimerKind>,
}

/// Tracks live driver handles per task name.
pub struct LiveTracker {
    inner: RwLock<HashMap<String, Entry>>,
    capacity: usize,
}

impl LiveTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            capacity: 2048,
        }
    }

    /// Configure the queue capacity for this subscriber.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Applies one event. Returns `true` if it changed the tracked state.
    pub fn update(&self, ev: &Event) -> bool {
        let relevant = matches!(
            ev.kind,
            EventKind::TimerRegistered | EventKind::TimerCancelled | EventKind::TickFired
        );
        let Some(name) = ev.task.as_deref() else {
            return false;
        };
        if !relevant {
            return false;
        }

        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let entry = map.entry(name.to_owned()).or_default();
        if ev.seq <= entry.last_seq {
            return false;
        }
        entry.last_seq = ev.seq;

        match (ev.kind, ev.handle, ev.timer) {
            (EventKind::TimerRegistered, Some(id), Some(kind)) => {
                entry.handles.insert(id, kind).is_none()
            }
            (EventKind::TimerCancelled, Some(id), _) => entry.handles.remove(&id).is_some(),
            (EventKind::TickFired, _, Some(TimerKind::OneShot)) => {
                let before = entry.handles.len();
                entry.handles.retain(|_, kind| *kind != TimerKind::OneShot);
                entry.handles.len() != before
            }
            _ => false,
        }
    }

    /// Number of live handles for `name`.
    #[must_use]
    pub fn live_count(&self, name: &str) -> usize {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(name).map_or(0, |e| e.handles.len())
    }

    /// Sorted `(task, live handle ids)` for every task holding at least one handle.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, Vec<u64>)> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut v: Vec<(String, Vec<u64>)> = map
            .iter()
            .filter(|(_, e)| !e.handles.is_empty())
            .map(|(name, e)| (name.clone(), e.handles.keys().copied().collect()))
            .collect();
        v.sort_unstable();
        v
    }
}

#[async_trait]
impl Subscribe for LiveTracker {
    async fn on_event(&self, ev: &Event) {
        self.update(ev);
    }

    fn name(&self) -> &'static str {
        "LiveTracker"
    }

    fn queue_capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LiveTracker {
    fn default() -> Self {
        Self::new()
    }
}
