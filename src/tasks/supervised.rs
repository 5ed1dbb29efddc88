//! # TaskSupervisor: idempotent start / stop / reset over one timed task.
//!
//! The supervisor owns a [`Timed`] task and turns repeated commands into at
//! most one driver registration. It holds no handle of its own: "running" is
//! whatever the wrapped task reports through [`Timed::is_armed`].
//!
//! ## Commands
//! ```text
//! start()  ── armed? ──yes──► StartIgnored
//!               │no
//!               ├─► invoke_now()            (options.immediate)
//!               ├─► arm()?                  (one registration)
//!               └─► SupervisorStarted
//!
//! stop()   ── armed? ──yes──► disarm() ─► SupervisorStopped
//!
//! reset()  ── stop() ─► start() ─► SupervisorReset
//! ```
//!
//! ## Rules
//! - The old registration is always cancelled before a new one is made
//! - With `immediate`, the behavior runs once **before** the timer is registered
//! - A failed `arm` leaves the supervisor stopped and returns the error

use std::sync::Arc;

use crate::core::Scheduler;
use crate::error::ScheduleError;
use crate::events::{Event, EventKind};
use crate::tasks::Timed;

/// Start behavior of a [`TaskSupervisor`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// Invoke the behavior once synchronously on every effective `start`.
    pub immediate: bool,
}

/// Controller exposing start / stop / reset / is-running over a [`Timed`] task.
pub struct TaskSupervisor<T: Timed> {
    task: T,
    options: SupervisorOptions,
    name: Arc<str>,
    sched: Scheduler,
}

impl<T: Timed> TaskSupervisor<T> {
    /// Wraps `task`. Nothing is started.
    pub fn new(sched: &Scheduler, task: T, options: SupervisorOptions) -> Self {
        let name = Arc::from(task.name());
        Self {
            task,
            options,
            name,
            sched: sched.clone(),
        }
    }

    /// Options this supervisor applies.
    pub fn options(&self) -> SupervisorOptions {
        self.options
    }

    /// Starts the task unless it is already running.
    pub fn start(&mut self) -> Result<(), ScheduleError> {
        if self.task.is_armed() {
            self.emit(EventKind::StartIgnored);
            return Ok(());
        }

        if self.options.immediate {
            self.task.invoke_now();
        }
        self.task.arm()?;
        self.emit(EventKind::SupervisorStarted);
        Ok(())
    }

    /// Stops the task. Idempotent.
    pub fn stop(&mut self) {
        if !self.task.is_armed() {
            return;
        }
        self.task.disarm();
        self.emit(EventKind::SupervisorStopped);
    }

    /// Stops, then starts with a fresh registration.
    pub fn reset(&mut self) -> Result<(), ScheduleError> {
        self.stop();
        self.start()?;
        self.emit(EventKind::SupervisorReset);
        Ok(())
    }

    /// Whether the wrapped task holds a live registration.
    pub fn is_running(&self) -> bool {
        self.task.is_armed()
    }

    /// The wrapped task.
    pub fn task(&self) -> &T {
        &self.task
    }

    /// Mutable access to the wrapped task.
    pub fn task_mut(&mut self) -> &mut T {
        &mut self.task
    }

    /// Returns the wrapped task, leaving its timer as it is.
    pub fn into_inner(self) -> T {
        self.task
    }

    fn emit(&self, kind: EventKind) {
        self.sched
            .publish(Event::new(kind).with_task(Arc::clone(&self.name)));
    }
}

impl<T: Timed + std::fmt::Debug> std::fmt::Debug for TaskSupervisor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSupervisor")
            .field("task", &self.task)
            .field("options", &self.options)
            .field("running", &self.is_running())
            .finish()
    }
}
