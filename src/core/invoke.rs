//! # Run one behavior invocation and report the outcome.
//!
//! Every tick goes through a [`Ticker`]: the closure a task hands to the timer
//! driver. The ticker never captures a behavior; it captures the behavior
//! **cell** and reads it at fire time, which is what keeps late ticks from
//! running stale closures.
//!
//! ## Event flow
//! ```text
//! driver ──► Ticker::fire()
//!              ├─► mark fired (one-shot only)
//!              ├─► ticks += 1
//!              ├─► publish TickFired { tick }
//!              └─► run_behavior(cell.get())
//!                     ├─ Ok(())  ──► (nothing)
//!                     ├─ Err(e)  ──► publish BehaviorFailed { reason }
//!                     └─ panic   ──► publish BehaviorPanicked { reason }
//! ```
//!
//! ## Rules
//! - Behavior errors and panics are **reported, never swallowed** and never retried
//! - The timer is independent of the outcome: nothing here cancels anything
//! - The cell lock is released before the behavior runs
//! - A failure nobody receives is written to stderr instead of being dropped

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::driver::{TickFn, TimerKind};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{BehaviorRef, LatestCell};

/// Closure state shared between a task and its driver registration.
#[derive(Clone)]
pub(crate) struct Ticker {
    pub(crate) bus: Bus,
    pub(crate) name: Arc<str>,
    pub(crate) kind: TimerKind,
    pub(crate) behavior: LatestCell<BehaviorRef>,
    pub(crate) ticks: Arc<AtomicU64>,
    /// Set before the behavior runs; only one-shots carry it.
    pub(crate) fired: Option<Arc<AtomicBool>>,
}

impl Ticker {
    /// Handles one tick from the driver.
    pub(crate) fn fire(&self) {
        if let Some(flag) = &self.fired {
            flag.store(true, Ordering::Release);
        }
        let tick = self.ticks.fetch_add(1, Ordering::AcqRel) + 1;
        self.bus.publish(
            Event::new(EventKind::TickFired)
                .with_task(Arc::clone(&self.name))
                .with_timer(self.kind)
                .with_tick(tick),
        );

        let behavior = self.behavior.get();
        run_behavior(&self.bus, &self.name, &behavior, Some(tick));
    }

    /// Converts the ticker into the closure handed to the driver.
    pub(crate) fn into_tick_fn(self) -> TickFn {
        Arc::new(move || self.fire())
    }
}

/// Invokes `behavior` once, publishing `BehaviorFailed` / `BehaviorPanicked` on failure.
pub(crate) fn run_behavior(bus: &Bus, name: &Arc<str>, behavior: &BehaviorRef, tick: Option<u64>) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (**behavior)()));

    let failure = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => Event::new(EventKind::BehaviorFailed).with_reason(e.to_string()),
        Err(payload) => {
            Event::new(EventKind::BehaviorPanicked).with_reason(panic_message(payload.as_ref()))
        }
    };

    let failure = failure.with_task(Arc::clone(name));
    report_failure(
        bus,
        match tick {
            Some(n) => failure.with_tick(n),
            None => failure,
        },
    );
}

/// Publishes a behavior failure; writes it to stderr when the bus has no receivers.
///
/// Returns `true` when a receiver got the event.
pub(crate) fn report_failure(bus: &Bus, ev: Event) -> bool {
    let line = format!(
        "[tickvisor] task={:?} tick={:?} {}: {}",
        ev.task.as_deref().unwrap_or("-"),
        ev.tick,
        ev.kind.as_label(),
        ev.reason.as_deref().unwrap_or("unknown"),
    );
    if bus.publish(ev) {
        return true;
    }
    eprintln!("{line}");
    false
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BehaviorError;
    use crate::tasks::behavior;

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn ticker(bus: &Bus, cell: &LatestCell<BehaviorRef>) -> Ticker {
        Ticker {
            bus: bus.clone(),
            name: Arc::from("t"),
            kind: TimerKind::Repeating,
            behavior: cell.clone(),
            ticks: Arc::new(AtomicU64::new(0)),
            fired: None,
        }
    }

    #[test]
    fn test_tick_reads_cell_at_fire_time() {
        let bus = Bus::new(16);
        let hits = Arc::new(AtomicU64::new(0));
        let cell = LatestCell::new(behavior(|| Ok(())));
        let tick_fn = ticker(&bus, &cell).into_tick_fn();

        let h = Arc::clone(&hits);
        cell.set(behavior(move || {
            h.fetch_add(10, Ordering::SeqCst);
            Ok(())
        }));
        tick_fn();

        assert_eq!(hits.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_failure_is_published_with_tick() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let cell = LatestCell::new(behavior(|| Err(BehaviorError::fail("nope"))));
        let t = ticker(&bus, &cell);

        t.fire();
        t.fire();

        let events = drain(&mut rx);
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::TickFired,
                EventKind::BehaviorFailed,
                EventKind::TickFired,
                EventKind::BehaviorFailed,
            ]
        );
        assert_eq!(events[3].tick, Some(2));
        assert_eq!(events[3].reason.as_deref(), Some("behavior failed: nope"));
    }

    #[test]
    fn test_panic_is_contained_and_reported() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let b: BehaviorRef = behavior(|| panic!("kaboom"));

        run_behavior(&bus, &Arc::from("p"), &b, None);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::BehaviorPanicked);
        assert_eq!(events[0].reason.as_deref(), Some("kaboom"));
        assert_eq!(events[0].tick, None);
    }

    #[test]
    fn test_unobserved_failure_falls_back_to_stderr() {
        let bus = Bus::new(16);
        let ev = Event::new(EventKind::BehaviorFailed)
            .with_task("lonely")
            .with_reason("behavior failed: nope");
        assert!(!report_failure(&bus, ev.clone()));

        let mut rx = bus.subscribe();
        assert!(report_failure(&bus, ev));
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::BehaviorFailed);
    }

    #[test]
    fn test_failure_without_receivers_keeps_ticking() {
        let bus = Bus::new(16);
        let hits = Arc::new(AtomicU64::new(0));
        let h = Arc::clone(&hits);
        let cell = LatestCell::new(behavior(move || {
            h.fetch_add(1, Ordering::SeqCst);
            Err(BehaviorError::fail("nope"))
        }));
        let t = ticker(&bus, &cell);

        t.fire();
        t.fire();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(t.ticks.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_one_shot_flag_set_before_behavior() {
        let bus = Bus::new(16);
        let flag = Arc::new(AtomicBool::new(false));
        let seen = Arc::new(AtomicBool::new(false));

        let (f, s) = (Arc::clone(&flag), Arc::clone(&seen));
        let cell = LatestCell::new(behavior(move || {
            s.store(f.load(Ordering::Acquire), Ordering::SeqCst);
            Ok(())
        }));
        let mut t = ticker(&bus, &cell);
        t.kind = TimerKind::OneShot;
        t.fired = Some(Arc::clone(&flag));

        t.fire();
        assert!(seen.load(Ordering::SeqCst));
    }
}
