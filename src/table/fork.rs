//! # Forks
//!
//! A [`Fork`] is the unit of mutual exclusion. It pairs a `tokio::sync::Mutex<()>`
//! (which does the actual excluding) with an owner slot that records *who* holds it,
//! so the table can answer "is this fork free?" and catch protocol violations.
//!
//! Possession is a value: locking a fork yields a [`HeldFork`], and the fork is
//! handed back when that value is dropped. There is no other way to release it.

use crate::instrument::EventKind;
use crate::table::ForkTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, MutexGuard};
use tracing::error;

/// Owner slot value of a fork nobody holds.
const NO_OWNER: usize = usize::MAX;

/// Observable state of a single fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForkState {
    Free,
    /// Held by the philosopher with this id.
    Held(usize),
}

impl fmt::Display for ForkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForkState::Free => write!(f, "free"),
            ForkState::Held(owner) => write!(f, "held by {}", owner),
        }
    }
}

/// A single mutually exclusive resource.
pub struct Fork {
    id: usize,
    lock: Mutex<()>,
    owner: AtomicUsize,
}

impl Fork {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            lock: Mutex::new(()),
            owner: AtomicUsize::new(NO_OWNER),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> ForkState {
        match self.owner.load(Ordering::Acquire) {
            NO_OWNER => ForkState::Free,
            owner => ForkState::Held(owner),
        }
    }

    pub fn is_held_by(&self, philosopher: usize) -> bool {
        self.state() == ForkState::Held(philosopher)
    }

    /// Waits for the fork's lock, then stamps `philosopher` as its owner.
    ///
    /// # Panics
    /// If the owner slot is already set once the lock is ours. That can only happen
    /// when a previous holder released the lock without clearing the slot.
    pub(crate) async fn take<'a>(
        &'a self,
        table: &'a ForkTable,
        philosopher: usize,
    ) -> HeldFork<'a> {
        let guard = self.lock.lock().await;
        let previous = self.owner.swap(philosopher, Ordering::AcqRel);
        assert_eq!(
            previous, NO_OWNER,
            "fork {} locked by philosopher {} while still owned by {}",
            self.id, philosopher, previous
        );
        table.observe(EventKind::Acquired, philosopher, Some(self.id));
        HeldFork {
            table,
            fork: self,
            philosopher,
            _guard: guard,
        }
    }
}

impl fmt::Debug for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fork")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

/// Proof that a philosopher holds one fork.
///
/// Dropping it clears the owner slot, reports the release and only then unlocks
/// the fork (the guard field is dropped after `Drop::drop` runs). A neighbour can
/// therefore never observe the fork as locked-but-unowned or owned-but-unlocked.
pub struct HeldFork<'a> {
    table: &'a ForkTable,
    fork: &'a Fork,
    philosopher: usize,
    _guard: MutexGuard<'a, ()>,
}

impl HeldFork<'_> {
    pub fn fork(&self) -> usize {
        self.fork.id
    }

    pub fn philosopher(&self) -> usize {
        self.philosopher
    }
}

impl Drop for HeldFork<'_> {
    fn drop(&mut self) {
        let cleared = self.fork.owner.compare_exchange(
            self.philosopher,
            NO_OWNER,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if let Err(actual) = cleared {
            error!(
                fork = self.fork.id,
                philosopher = self.philosopher,
                actual,
                "Released a fork owned by someone else"
            );
            if !std::thread::panicking() {
                panic!(
                    "philosopher {} released fork {} owned by {}",
                    self.philosopher, self.fork.id, actual
                );
            }
        }
        self.table
            .observe(EventKind::Released, self.philosopher, Some(self.fork.id));
    }
}

impl fmt::Debug for HeldFork<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeldFork")
            .field("fork", &self.fork.id)
            .field("philosopher", &self.philosopher)
            .finish()
    }
}
