//! # Timed tasks and their building blocks.
//!
//! This module provides the task-level types:
//! - [`LatestCell`] - single-slot holder read by ticks at fire time
//! - [`BehaviorRef`] - shared behavior (`Arc<dyn Fn() -> Result<..>>`)
//! - [`Period`] - repeating period with a paused sentinel
//! - [`RepeatingTask`] - interval timer with a swappable behavior
//! - [`OneShotTask`] - timeout timer with a swappable behavior
//! - [`Timed`] - trait supervised by [`TaskSupervisor`]
//! - [`TaskSupervisor`] - idempotent start / stop / reset

mod behavior;
mod cell;
mod one_shot;
mod period;
mod repeating;
mod supervised;
mod timed;

pub use behavior::{BehaviorRef, behavior};
pub use cell::LatestCell;
pub use one_shot::OneShotTask;
pub use period::{Period, checked_millis};
pub use repeating::{RepeatingTask, TaskState};
pub use supervised::{SupervisorOptions, TaskSupervisor};
pub use timed::Timed;
