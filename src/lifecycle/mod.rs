//! # Dinner Lifecycle
//!
//! The table and the philosophers are simple on their own; this module puts them
//! together and runs them.
//!
//! **Key Responsibilities:**
//! 1. **Configuration** - [`DinnerConfig`], validated before anything starts
//! 2. **Table Setup** - one [`ForkTable`](crate::table::ForkTable) per dinner, owned here, shared with every seat
//! 3. **Spawning** - one Tokio task per philosopher
//! 4. **Joining** - collecting every outcome into a [`DinnerReport`]
//! 5. **Shutdown** - stopping an endless dinner cleanly
//! 6. **Observability Setup** - [`setup_tracing`]
//!
//! ## The Dispatcher Pattern
//!
//! ```rust,ignore
//! // 1. Validate the config, build the table, seat the philosophers
//! let dispatcher = Dispatcher::new(DinnerConfig::new(5).forever(), Narrator::default())?;
//!
//! // 2. Spawn one task per philosopher
//! let dinner = dispatcher.start();
//!
//! // 3. Later: stop them and collect the outcome
//! let report = dinner.shutdown().await;
//! ```
//!
//! ## Failure Isolation
//!
//! A philosopher whose hook fails (or panics) ends its own task only. Its forks are
//! released on the way out, so its neighbours keep eating, and
//! [`Dinner::join`] still waits for everyone. The failure shows up in
//! [`DinnerReport::failures`].
//!
//! ## Graceful Shutdown
//!
//! 1. **Signal** - [`Dinner::stop`] flips a `watch` channel every philosopher holds
//! 2. **Philosophers notice** - before the next cycle, or while waiting hungry
//! 3. **Meals finish** - a philosopher already eating finishes and releases its forks
//! 4. **Await completion** - every task is joined

pub mod config;
pub mod dispatcher;
pub mod tracing;

pub use config::*;
pub use dispatcher::*;
pub use tracing::*;
