//! # Runtime events emitted by timers, supervisors and the subscriber set.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Timer events**: registrations, cancellations and refused registrations
//! - **Tick events**: ticks, immediate invocations and behavior failures
//! - **Control events**: behavior/period changes and supervisor commands
//! - **Subscriber events**: overflow and panics inside subscribers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! timer handle, period and tick number.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use tickvisor::{Event, EventKind, TimerKind};
//!
//! let ev = Event::new(EventKind::BehaviorFailed)
//!     .with_task("heartbeat")
//!     .with_timer(TimerKind::Repeating)
//!     .with_tick(3)
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::BehaviorFailed);
//! assert_eq!(ev.task.as_deref(), Some("heartbeat"));
//! assert_eq!(ev.tick, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::driver::{TimerHandle, TimerKind};
use crate::tasks::Period;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Timer events ===
    /// The driver accepted a registration.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `handle`, `timer`: the new handle
    /// - `period_ms`: period (repeating) or delay (one-shot)
    TimerRegistered,

    /// A live registration was cancelled.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `handle`, `timer`: the cancelled handle
    TimerCancelled,

    /// The driver refused a registration; the task stays paused.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `timer`: requested kind
    /// - `reason`: driver error label
    RegistrationFailed,

    // === Tick events ===
    /// A timer fired and the current behavior is about to run.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `timer`: kind of timer that fired (a one-shot is gone after this event)
    /// - `tick`: tick number (1-based, per task)
    TickFired,

    /// A supervisor invoked the behavior synchronously on start.
    ///
    /// Sets:
    /// - `task`: task name
    ImmediateInvoked,

    /// The behavior returned an error. The timer keeps running.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `tick`: tick number (absent for immediate invocations)
    /// - `reason`: error message
    BehaviorFailed,

    /// The behavior panicked. The panic was contained; the timer keeps running.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `tick`: tick number (absent for immediate invocations)
    /// - `reason`: panic payload
    BehaviorPanicked,

    // === Control events ===
    /// The behavior slot was replaced.
    ///
    /// Sets:
    /// - `task`: task name
    BehaviorReplaced,

    /// A repeating task applied a new period.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `period_ms`: new period, absent when paused
    /// - `reason`: `"paused"` when the new period is the paused sentinel
    PeriodChanged,

    /// `start()` was called on a running supervisor and ignored.
    ///
    /// Sets:
    /// - `task`: task name
    StartIgnored,

    /// A supervisor started its task.
    SupervisorStarted,

    /// A supervisor stopped its task.
    SupervisorStopped,

    /// A supervisor reset its task (stop followed by start).
    SupervisorReset,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

impl EventKind {
    /// Returns a short stable label used by log output.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::TimerRegistered => "registered",
            EventKind::TimerCancelled => "cancelled",
            EventKind::RegistrationFailed => "registration-failed",
            EventKind::TickFired => "tick",
            EventKind::ImmediateInvoked => "immediate",
            EventKind::BehaviorFailed => "behavior-failed",
            EventKind::BehaviorPanicked => "behavior-panicked",
            EventKind::BehaviorReplaced => "behavior-replaced",
            EventKind::PeriodChanged => "period-changed",
            EventKind::StartIgnored => "start-ignored",
            EventKind::SupervisorStarted => "started",
            EventKind::SupervisorStopped => "stopped",
            EventKind::SupervisorReset => "reset",
            EventKind::SubscriberPanicked => "subscriber-panicked",
            EventKind::SubscriberOverflow => "subscriber-overflow",
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Driver handle id.
    pub handle: Option<u64>,
    /// Kind of timer involved.
    pub timer: Option<TimerKind>,
    /// Period or delay in milliseconds (compact).
    pub period_ms: Option<u32>,
    /// Tick number (starting from 1).
    pub tick: Option<u64>,
    /// Human-readable reason (errors, panic payloads, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            handle: None,
            timer: None,
            period_ms: None,
            tick: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a driver handle (id and timer kind).
    #[inline]
    pub fn with_handle(mut self, handle: TimerHandle) -> Self {
        self.handle = Some(handle.id());
        self.timer = Some(handle.kind());
        self
    }

    /// Attaches a timer kind without a handle.
    #[inline]
    pub fn with_timer(mut self, kind: TimerKind) -> Self {
        self.timer = Some(kind);
        self
    }

    /// Attaches a period or delay (stored as milliseconds).
    #[inline]
    pub fn with_duration(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.period_ms = Some(ms);
        self
    }

    /// Attaches a [`Period`]; the paused sentinel is recorded as reason `"paused"`.
    #[inline]
    pub fn with_period(self, period: Period) -> Self {
        match period.as_duration() {
            Some(d) => self.with_duration(d),
            None => self.with_reason("paused"),
        }
    }

    /// Attaches a tick number.
    #[inline]
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for `BehaviorFailed` and `BehaviorPanicked`.
    #[inline]
    pub fn is_behavior_error(&self) -> bool {
        matches!(
            self.kind,
            EventKind::BehaviorFailed | EventKind::BehaviorPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::TickFired);
        let b = Event::new(EventKind::TickFired);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_paused_period_sets_reason() {
        let ev = Event::new(EventKind::PeriodChanged).with_period(Period::Paused);
        assert_eq!(ev.period_ms, None);
        assert_eq!(ev.reason.as_deref(), Some("paused"));

        let ev = Event::new(EventKind::PeriodChanged)
            .with_period(Period::every(Duration::from_millis(250)));
        assert_eq!(ev.period_ms, Some(250));
        assert!(ev.reason.is_none());
    }

    #[test]
    fn test_duration_saturates() {
        let ev = Event::new(EventKind::TimerRegistered).with_duration(Duration::MAX);
        assert_eq!(ev.period_ms, Some(u32::MAX));
    }

    #[test]
    fn test_behavior_error_classification() {
        assert!(Event::new(EventKind::BehaviorPanicked).is_behavior_error());
        assert!(Event::new(EventKind::BehaviorFailed).is_behavior_error());
        assert!(!Event::new(EventKind::TickFired).is_behavior_error());
    }
}
