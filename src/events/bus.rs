//! # Bus: where ticks, tasks and supervisors report what happened.
//!
//! Every driver call, tick and behavior outcome is turned into an [`Event`] and
//! handed to the scheduler's [`Bus`]. Ticks run on driver threads (or inside
//! `ManualDriver::advance`), so publishing is synchronous and lock-free.
//!
//! ```text
//!   Scheduler::register / cancel ──┐
//!   Ticker::fire / run_behavior  ──┼──► Bus ──┬──► bus listener ──► SubscriberSet
//!   RepeatingTask / OneShotTask  ──┤          └──► Scheduler::subscribe() receivers
//!   TaskSupervisor               ──┘
//! ```
//!
//! `publish` returns whether at least one receiver took the event. Most events
//! are informational and may go unobserved; behavior failures may not, and
//! `run_behavior` falls back to stderr when nobody is listening.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for scheduler events (cheap to clone).
///
/// A single ring buffer of `capacity` events is shared by all receivers; a
/// receiver that falls further behind gets `RecvError::Lagged` and skips ahead.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus holding at most `capacity` undelivered events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes `ev`; returns `false` if no receiver exists and the event was dropped.
    pub fn publish(&self, ev: Event) -> bool {
        self.tx.send(ev).is_ok()
    }

    /// Creates a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers (listener included).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_publish_reports_missing_receivers() {
        let bus = Bus::new(0);
        assert_eq!(bus.receiver_count(), 0);
        assert!(!bus.publish(Event::new(EventKind::TickFired)));

        let rx = bus.subscribe();
        assert!(bus.publish(Event::new(EventKind::TickFired)));
        drop(rx);
        assert!(!bus.publish(Event::new(EventKind::TickFired)));
    }

    #[test]
    fn test_receiver_sees_events_after_subscribe() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::TimerRegistered));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::TickFired).with_task("a"));

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::TickFired);
        assert_eq!(ev.task.as_deref(), Some("a"));
        assert!(rx.try_recv().is_err());
    }
}
