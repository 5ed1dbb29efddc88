//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [registered] task="poll" handle=Some(1) timer=Some(Repeating) period_ms=Some(100)
//! [tick] task="poll" tick=Some(1)
//! [behavior-failed] task="poll" tick=Some(1) reason="behavior failed: timeout"
//! [cancelled] task="poll" handle=Some(1)
//! [sup-started] task="poll"
//! [sup-reset] task="poll"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("unknown");

        match e.kind {
            EventKind::TimerRegistered => {
                println!(
                    "[registered] task={task:?} handle={:?} timer={:?} period_ms={:?}",
                    e.handle, e.timer, e.period_ms
                );
            }
            EventKind::TimerCancelled => {
                println!("[cancelled] task={task:?} handle={:?}", e.handle);
            }
            EventKind::RegistrationFailed => {
                println!("[registration-failed] task={task:?} reason={reason:?}");
            }
            EventKind::TickFired => {
                println!("[tick] task={task:?} tick={:?}", e.tick);
            }
            EventKind::ImmediateInvoked => {
                println!("[immediate] task={task:?}");
            }
            EventKind::BehaviorFailed | EventKind::BehaviorPanicked => {
                println!(
                    "[{}] task={task:?} tick={:?} reason={reason:?}",
                    e.kind.as_label(),
                    e.tick
                );
            }
            EventKind::BehaviorReplaced => {
                println!("[behavior-replaced] task={task:?}");
            }
            EventKind::PeriodChanged => {
                println!(
                    "[period] task={task:?} period_ms={:?} reason={:?}",
                    e.period_ms, e.reason
                );
            }
            EventKind::StartIgnored => {
                println!("[start-ignored] task={task:?}");
            }
            EventKind::SupervisorStarted
            | EventKind::SupervisorStopped
            | EventKind::SupervisorReset => {
                println!("[sup-{}] task={task:?}", e.kind.as_label());
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] subscriber={task} reason={reason}");
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panicked] subscriber={task} info={reason}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
