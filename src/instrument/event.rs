//! Event records emitted by the table and the philosophers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Entered THINKING.
    Thinking,
    /// Entered HUNGRY and is about to request its forks.
    Hungry,
    /// Holds both forks; hooks are about to run.
    Eating,
    /// Took a fork (`fork` is set).
    Acquired,
    /// Gave a fork back (`fork` is set).
    Released,
    /// Gave up waiting for its forks.
    TimedOut,
    /// Done with all its cycles.
    Finished,
    /// Stopped because a hook failed.
    Failed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Thinking => "thinking",
            EventKind::Hungry => "hungry",
            EventKind::Eating => "eating",
            EventKind::Acquired => "acquired",
            EventKind::Released => "released",
            EventKind::TimedOut => "timed_out",
            EventKind::Finished => "finished",
            EventKind::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One observation: `(kind, philosopher, fork?, timestamp)`.
///
/// `at` is measured from the moment the [`ForkTable`](crate::table::ForkTable) was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub philosopher: usize,
    pub fork: Option<usize>,
    pub at: Duration,
}
