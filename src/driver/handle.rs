use std::fmt;

/// Kind of a driver registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Interval-style registration.
    Repeating,
    /// Timeout-style registration.
    OneShot,
}

impl TimerKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TimerKind::Repeating => "repeating",
            TimerKind::OneShot => "one_shot",
        }
    }
}

/// Opaque token for a live driver registration.
///
/// Only drivers create handles; the id is unique per driver instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
    kind: TimerKind,
}

impl TimerHandle {
    pub(crate) fn new(id: u64, kind: TimerKind) -> Self {
        Self { id, kind }
    }

    /// Driver-assigned id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Registration kind.
    pub fn kind(&self) -> TimerKind {
        self.kind
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind.as_label(), self.id)
    }
}
