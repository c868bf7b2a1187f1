use crate::instrument::EventKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a philosopher is in its THINKING → HUNGRY → EATING cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhilosopherState {
    #[default]
    Thinking,
    /// Waiting in `acquire_pair`.
    Hungry,
    /// Holding both forks.
    Eating,
    Done,
}

impl PhilosopherState {
    pub(crate) fn event(self) -> EventKind {
        match self {
            PhilosopherState::Thinking => EventKind::Thinking,
            PhilosopherState::Hungry => EventKind::Hungry,
            PhilosopherState::Eating => EventKind::Eating,
            PhilosopherState::Done => EventKind::Finished,
        }
    }
}

impl fmt::Display for PhilosopherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.event(), f)
    }
}
