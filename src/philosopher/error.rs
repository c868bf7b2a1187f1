//! Error types for philosophers.

use crate::philosopher::Hook;
use crate::table::TableError;
use thiserror::Error;

/// Why a philosopher stopped before finishing its cycles.
///
/// A timed-out attempt is *not* an error; see [`Meal::TimedOut`](crate::philosopher::Meal).
#[derive(Debug, Error)]
pub enum PhilosopherError {
    /// A user-supplied hook returned an error. The forks were released regardless.
    #[error("Philosopher {philosopher}: {hook} hook failed: {source}")]
    Hook {
        philosopher: usize,
        hook: Hook,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The table refused the request; the acquisition order was bypassed somehow.
    #[error("Philosopher {philosopher}: protocol violation: {source}")]
    Protocol {
        philosopher: usize,
        source: TableError,
    },

    /// The philosopher's task panicked. Its forks were released during unwinding.
    #[error("Philosopher {philosopher} panicked: {message}")]
    Panicked { philosopher: usize, message: String },
}

impl PhilosopherError {
    pub fn philosopher(&self) -> usize {
        match self {
            PhilosopherError::Hook { philosopher, .. }
            | PhilosopherError::Protocol { philosopher, .. }
            | PhilosopherError::Panicked { philosopher, .. } => *philosopher,
        }
    }

    /// The failing hook, for `Hook` errors.
    pub fn hook(&self) -> Option<Hook> {
        match self {
            PhilosopherError::Hook { hook, .. } => Some(*hook),
            _ => None,
        }
    }
}
