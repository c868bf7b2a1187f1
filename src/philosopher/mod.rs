//! # Philosophers
//!
//! A [`Philosopher`] is a small state machine sitting at seat `id` of a
//! [`ForkTable`]. Its left fork is `id`, its right fork `(id + 1) % n`, so the right
//! fork of one seat is the left fork of the next.
//!
//! ```text
//!  THINKING ──▶ HUNGRY ──acquire_pair──▶ EATING ──release_pair──▶ THINKING ...
//!                  │                                                 │
//!                  └── timeout: back to THINKING     last cycle: DONE ┘
//! ```
//!
//! - THINKING → HUNGRY is immediate.
//! - HUNGRY → EATING waits in [`ForkTable::acquire_pair`], the only blocking point.
//!   With a hungry timeout the attempt can be abandoned ([`Meal::TimedOut`]); with a
//!   stop signal (see [`Philosopher::with_stop`]) it can be interrupted.
//! - EATING runs the [`Behavior`] hooks `pick_left`, `pick_right`, `eat`, `put_left`,
//!   `put_right`, then **always** releases the forks, whatever the hooks returned.

pub mod behavior;
pub mod error;
pub mod state;

pub use behavior::*;
pub use error::*;
pub use state::*;

use crate::instrument::EventKind;
use crate::lifecycle::Cycles;
use crate::table::{ForkPair, ForkTable, TableError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Outcome of a single THINKING → HUNGRY → … cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Meal {
    /// Ate and put both forks back.
    Eaten,
    /// Waited longer than the hungry timeout and went back to thinking.
    TimedOut,
    /// A stop was requested while hungry.
    Interrupted,
}

/// What a philosopher did over its whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhilosopherReport {
    pub philosopher: usize,
    pub meals: u64,
    pub timeouts: u64,
}

/// One seat at the table.
#[derive(Debug)]
pub struct Philosopher {
    id: usize,
    left: usize,
    right: usize,
    state: PhilosopherState,
    table: Arc<ForkTable>,
    stop: Option<watch::Receiver<bool>>,
}

impl Philosopher {
    /// Seats philosopher `id` at `table`.
    pub fn new(id: usize, table: Arc<ForkTable>) -> Result<Self, TableError> {
        let (left, right) = table.seats(id)?;
        Ok(Self {
            id,
            left,
            right,
            state: PhilosopherState::Thinking,
            table,
            stop: None,
        })
    }

    /// Lets `stop` end the run: checked before each cycle, and it interrupts a
    /// HUNGRY wait. A meal in progress is always finished. Dropping the sender counts
    /// as a stop.
    pub fn with_stop(mut self, stop: watch::Receiver<bool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn left(&self) -> usize {
        self.left
    }

    pub fn right(&self) -> usize {
        self.right
    }

    pub fn state(&self) -> PhilosopherState {
        self.state
    }

    fn enter(&mut self, state: PhilosopherState) {
        self.state = state;
        self.table.observe(state.event(), self.id, None);
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|stop| stop.has_changed().is_err() || *stop.borrow())
    }

    /// Runs exactly one cycle.
    ///
    /// On a hook error the remaining hooks are skipped, the forks are released, and
    /// the error is returned. The philosopher is left THINKING in every case.
    pub async fn dine<B: Behavior + ?Sized>(
        &mut self,
        behavior: &B,
        hungry_timeout: Option<Duration>,
    ) -> Result<Meal, PhilosopherError> {
        // 1. THINKING -> HUNGRY
        self.enter(PhilosopherState::Hungry);

        // 2. Wait for both forks, racing the timeout and the stop signal
        let table = Arc::clone(&self.table);
        let acquire = acquire_within(&table, self.id, self.left, self.right, hungry_timeout);
        let acquired = match self.stop.as_mut() {
            Some(stop) => tokio::select! {
                acquired = acquire => Some(acquired),
                _ = stopped(stop) => None,
            },
            None => Some(acquire.await),
        };

        let pair = match acquired {
            Some(Ok(Some(pair))) => pair,
            Some(Ok(None)) => {
                debug!(philosopher = self.id, ?hungry_timeout, "Hungry timeout");
                table.observe(EventKind::TimedOut, self.id, None);
                self.enter(PhilosopherState::Thinking);
                return Ok(Meal::TimedOut);
            }
            Some(Err(source)) => {
                self.enter(PhilosopherState::Thinking);
                return Err(PhilosopherError::Protocol {
                    philosopher: self.id,
                    source,
                });
            }
            None => {
                self.enter(PhilosopherState::Thinking);
                return Ok(Meal::Interrupted);
            }
        };

        // 3. Eat, then always give the forks back
        self.enter(PhilosopherState::Eating);
        let eaten = self.run_hooks(behavior).await;
        table.release_pair(pair);
        self.enter(PhilosopherState::Thinking);
        eaten.map(|()| Meal::Eaten)
    }

    async fn run_hooks<B: Behavior + ?Sized>(&self, behavior: &B) -> Result<(), PhilosopherError> {
        for hook in Hook::ALL {
            self::behavior::call(behavior, hook, self.id)
                .await
                .map_err(|e| PhilosopherError::Hook {
                    philosopher: self.id,
                    hook,
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    /// Runs cycles until `cycles` is exhausted, a stop is requested, or a hook fails.
    pub async fn run<B: Behavior + ?Sized>(
        mut self,
        behavior: Arc<B>,
        cycles: Cycles,
        hungry_timeout: Option<Duration>,
    ) -> Result<PhilosopherReport, PhilosopherError> {
        let mut report = PhilosopherReport {
            philosopher: self.id,
            ..Default::default()
        };
        self.enter(PhilosopherState::Thinking);

        let mut started = 0;
        while cycles.allows(started) && !self.stop_requested() {
            started += 1;
            match self.dine(behavior.as_ref(), hungry_timeout).await {
                Ok(Meal::Eaten) => report.meals += 1,
                Ok(Meal::TimedOut) => report.timeouts += 1,
                Ok(Meal::Interrupted) => break,
                Err(e) => {
                    warn!(philosopher = self.id, error = %e, "Leaving the table");
                    self.state = PhilosopherState::Done;
                    self.table.observe(EventKind::Failed, self.id, None);
                    return Err(e);
                }
            }
        }

        self.enter(PhilosopherState::Done);
        Ok(report)
    }
}

/// Acquires the pair, giving up after `limit`. `Ok(None)` means the limit ran out;
/// any fork taken before that has already been given back.
async fn acquire_within(
    table: &ForkTable,
    philosopher: usize,
    left: usize,
    right: usize,
    limit: Option<Duration>,
) -> Result<Option<ForkPair<'_>>, TableError> {
    let pending = table.acquire_pair(philosopher, left, right);
    match limit {
        Some(limit) => match tokio::time::timeout(limit, pending).await {
            Ok(pair) => pair.map(Some),
            Err(_) => Ok(None),
        },
        None => pending.await.map(Some),
    }
}

/// Resolves once `stop` reads `true` or the sender is gone.
async fn stopped(stop: &mut watch::Receiver<bool>) {
    // Err means the sender was dropped: nobody is left to collect this run.
    let _ = stop.wait_for(|stop| *stop).await.map(|_| ());
}
