//! # Dining Table
//!
//! > **Deadlock-free sharing of paired resources, on Tokio.**
//!
//! `n` philosophers sit around a table with `n` forks, one between each pair of
//! neighbours. To eat, a philosopher needs *both* of its forks at once. This crate
//! provides the acquisition protocol that makes that safe: mutual exclusion per fork,
//! philosophers running in parallel, and no deadlock however they are scheduled.
//!
//! ## 🏗️ Design
//!
//! ### Ordered Acquisition
//! Every pair of forks is locked **lower index first**. That single rule removes the
//! circular wait that makes the naive "left then right" dinner deadlock. See the
//! [`table`] module for the argument.
//!
//! ### What It Does Not Do
//! - **Fairness**: a philosopher can, in principle, keep losing the race for a fork.
//!   Deadlock freedom is guaranteed; starvation freedom is not.
//! - **Distribution**: everything lives in one process.
//! - **Other shapes**: each philosopher needs exactly its two neighbouring forks.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Possession Is a Value
//! Acquiring forks returns a [`ForkPair`](table::ForkPair) guard. Releasing consumes
//! it; dropping it releases too. An error in a hook, a panic, or a timed-out wait
//! cannot leak a held fork.
//!
//! ### 2. Hooks Are a Trait
//! What a philosopher does while it eats is a [`Behavior`](philosopher::Behavior): five
//! async hooks, all optional, with the behavior's own error type.
//!
//! ### 3. Concurrency Model
//! One Tokio task per philosopher, joined by the [`Dispatcher`](lifecycle::Dispatcher).
//! Run on the multi-threaded runtime for real parallelism.
//!
//! ### 4. Observability
//! Every transition and every fork acquire/release becomes an
//! [`Event`](instrument::Event) for an [`Observer`](instrument::Observer). By default
//! events go to `tracing`; tests use a [`Recorder`](instrument::Recorder).
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Protocol ([`table`])
//! - **Role**: owns the forks and hands them out in ordered pairs.
//! - **Key items**: [`ForkTable`](table::ForkTable), [`Fork`](table::Fork), [`ForkPair`](table::ForkPair).
//!
//! ### 2. The Actors ([`philosopher`])
//! - **Role**: the THINKING → HUNGRY → EATING state machine and its hooks.
//! - **Key items**: [`Philosopher`](philosopher::Philosopher), [`Behavior`](philosopher::Behavior), [`Narrator`](philosopher::Narrator).
//!
//! ### 3. The Orchestrator ([`lifecycle`])
//! - **Role**: configuration, spawning, joining, shutdown, logging setup.
//! - **Key items**: [`DinnerConfig`](lifecycle::DinnerConfig), [`Dispatcher`](lifecycle::Dispatcher), [`DinnerReport`](lifecycle::DinnerReport).
//!
//! ### 4. The Observers ([`instrument`]) and Test Doubles ([`mock`])
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use dining_table::lifecycle::{DinnerConfig, Dispatcher};
//! use dining_table::philosopher::Narrator;
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = Dispatcher::new(DinnerConfig::new(5).cycles(3), Narrator::default()).unwrap();
//!     let report = dispatcher.run().await;
//!     assert_eq!(report.meals(), 15);
//! }
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info DINING_CYCLES=3 cargo run
//! ```

pub mod instrument;
pub mod lifecycle;
pub mod mock;
pub mod philosopher;
pub mod table;
