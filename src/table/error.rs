//! Error types for the fork table.

use thiserror::Error;

/// Errors raised by [`ForkTable`](crate::table::ForkTable).
///
/// Everything except `TooFewForks` is a protocol violation by the caller. They are
/// detected before any lock is taken, so a rejected request never holds a fork.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    /// A table needs at least two forks for the neighbour pattern to exist.
    #[error("A table needs at least 2 forks, got {0}")]
    TooFewForks(usize),

    /// The requested fork index is outside `0..size`.
    #[error("Fork {fork} does not exist (table has {size} forks)")]
    NoSuchFork { fork: usize, size: usize },

    /// The philosopher id is outside `0..size`.
    #[error("Seat {philosopher} does not exist (table has {size} seats)")]
    NoSuchSeat { philosopher: usize, size: usize },

    /// Both halves of a pair name the same fork.
    #[error("Fork {0} requested twice in one pair")]
    SameFork(usize),

    /// The philosopher asked for a fork it already holds.
    #[error("Philosopher {philosopher} already holds fork {fork}")]
    AlreadyHeld { fork: usize, philosopher: usize },
}
