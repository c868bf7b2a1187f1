//! # The Fork Table
//!
//! [`ForkTable`] owns every [`Fork`] of a dinner and is the only way to take them.
//!
//! ## Ordered Acquisition
//!
//! Philosopher `i` needs forks `i` and `(i + 1) % n`. If everyone grabbed "left then
//! right", all `n` philosophers could hold their left fork and wait forever for the
//! right one. [`ForkTable::acquire_pair`] instead always locks the **lower index
//! first**. The last philosopher's request `{n-1, 0}` becomes `{0, n-1}`, the wait
//! graph can no longer close into a cycle, and the dinner cannot deadlock for any
//! `n >= 2`.
//!
//! Nothing here makes the dinner *fair*: which waiter wins a contended fork is up to
//! the underlying mutex.
//!
//! ## Possession as a Value
//!
//! A successful acquisition returns a [`ForkPair`]. Holding the pair *is* holding the
//! forks; [`ForkTable::release_pair`] consumes it and gives the forks back, higher
//! index first. If the pair is dropped instead (an error path, a panic while eating,
//! a timed-out or cancelled acquisition that only got the first fork) exactly the
//! forks that were taken are released, in the same order.
//!
//! The table needs no lock of its own; all coordination lives in the per-fork locks.

pub mod error;
pub mod fork;

pub use error::*;
pub use fork::*;

use crate::instrument::{Event, EventKind, Observer, TracingObserver};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Owns the forks of one dinner and hands them out in pairs.
pub struct ForkTable {
    forks: Vec<Fork>,
    observer: Arc<dyn Observer>,
    epoch: Instant,
}

impl ForkTable {
    /// Creates a table of `size` forks that reports to a [`TracingObserver`].
    pub fn new(size: usize) -> Result<Self, TableError> {
        Self::with_observer(size, Arc::new(TracingObserver))
    }

    /// Creates a table of `size` forks that reports every acquire and release to
    /// `observer`.
    pub fn with_observer(size: usize, observer: Arc<dyn Observer>) -> Result<Self, TableError> {
        if size < 2 {
            return Err(TableError::TooFewForks(size));
        }
        Ok(Self {
            forks: (0..size).map(Fork::new).collect(),
            observer,
            epoch: Instant::now(),
        })
    }

    pub fn len(&self) -> usize {
        self.forks.len()
    }

    /// Always `false`: a table has at least two forks.
    pub fn is_empty(&self) -> bool {
        self.forks.is_empty()
    }

    pub fn fork(&self, id: usize) -> Option<&Fork> {
        self.forks.get(id)
    }

    pub fn fork_state(&self, id: usize) -> Option<ForkState> {
        self.fork(id).map(Fork::state)
    }

    /// True when nobody holds any fork.
    pub fn all_free(&self) -> bool {
        self.forks.iter().all(|f| f.state() == ForkState::Free)
    }

    /// The `(left, right)` forks of a seat: `(id, (id + 1) % n)`.
    pub fn seats(&self, philosopher: usize) -> Result<(usize, usize), TableError> {
        let size = self.len();
        if philosopher >= size {
            return Err(TableError::NoSuchSeat { philosopher, size });
        }
        Ok((philosopher, (philosopher + 1) % size))
    }

    /// Blocks until `philosopher` exclusively holds forks `a` and `b`.
    ///
    /// The lower index is always locked first. The request is validated before any
    /// lock is taken, so an `Err` never leaves a fork held. `philosopher` must be a
    /// seat of this table.
    pub async fn acquire_pair(
        &self,
        philosopher: usize,
        a: usize,
        b: usize,
    ) -> Result<ForkPair<'_>, TableError> {
        let size = self.len();
        if philosopher >= size {
            return Err(TableError::NoSuchSeat { philosopher, size });
        }
        if a == b {
            return Err(TableError::SameFork(a));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        if high >= size {
            return Err(TableError::NoSuchFork { fork: high, size });
        }
        for fork in [low, high] {
            if self.forks[fork].is_held_by(philosopher) {
                return Err(TableError::AlreadyHeld { fork, philosopher });
            }
        }

        debug!(philosopher, low, high, "Acquiring pair");
        let low = self.forks[low].take(self, philosopher).await;
        let high = self.forks[high].take(self, philosopher).await;
        Ok(ForkPair { high, low })
    }

    /// Gives both forks of `pair` back, higher index first.
    pub fn release_pair(&self, pair: ForkPair<'_>) {
        debug!(
            philosopher = pair.philosopher(),
            low = pair.low(),
            high = pair.high(),
            "Releasing pair"
        );
        drop(pair);
    }

    pub(crate) fn observe(&self, kind: EventKind, philosopher: usize, fork: Option<usize>) {
        self.observer.observe(&Event {
            kind,
            philosopher,
            fork,
            at: self.epoch.elapsed(),
        });
    }
}

impl fmt::Debug for ForkTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkTable").field("forks", &self.forks).finish()
    }
}

/// Two forks held together by one philosopher.
///
/// Field order matters: `high` is declared first so it is dropped (released) first.
#[derive(Debug)]
pub struct ForkPair<'a> {
    high: HeldFork<'a>,
    low: HeldFork<'a>,
}

impl ForkPair<'_> {
    pub fn philosopher(&self) -> usize {
        self.low.philosopher()
    }

    pub fn low(&self) -> usize {
        self.low.fork()
    }

    pub fn high(&self) -> usize {
        self.high.fork()
    }
}
