//! Runtime core: scheduler context, configuration and tick invocation.
//!
//! The public API from this module is [`Scheduler`], its [`SchedulerBuilder`]
//! and the [`Config`] they are built from.
//!
//! Internal modules:
//! - [`scheduler`]: shared context; registers/cancels timers and publishes the matching events;
//! - [`builder`]: wires bus, subscribers and driver together;
//! - [`config`]: runtime settings and period validation;
//! - [`invoke`]: runs one behavior invocation and reports failures.

mod builder;
mod config;
pub(crate) mod invoke;
mod scheduler;

pub use builder::SchedulerBuilder;
pub use config::{Config, MissedTick};
pub use scheduler::Scheduler;
