//! # Logging
//!
//! [`setup_tracing`] installs the subscriber used by the binary. Everything else in
//! the crate only *emits* through `tracing`; libraries embedding the table bring their
//! own subscriber.
//!
//! ## What Gets Logged
//!
//! - **Dinner lifecycle** (`info`): start, shutdown, final tallies
//! - **Behavior hooks** (`info`, [`Narrator`](crate::philosopher::Narrator) only): "Picked up left fork", "Eating", ...
//! - **State changes** (`debug`): thinking / hungry / eating per philosopher
//! - **Fork traffic** (`trace`): every acquire and release, with the fork index
//! - **Failures** (`warn`/`error`): hook errors, panicked tasks
//!
//! Each philosopher task runs inside a `philosopher{id=N}` span, so with the compact
//! format every line is prefixed with the seat it came from.
//!
//! ## Usage
//!
//! ```bash
//! # Hooks and lifecycle
//! RUST_LOG=info cargo run
//!
//! # Plus state transitions
//! RUST_LOG=debug cargo run
//!
//! # Plus every fork acquire/release
//! RUST_LOG=trace cargo run
//! ```
//!
//! Thread ids are shown so the parallelism of the dinner is visible in the output:
//!
//! ```text
//! INFO ThreadId(03) philosopher: Picked up left fork id=2 philosopher=2
//! INFO ThreadId(05) philosopher: Picked up left fork id=0 philosopher=0
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .compact()
        .init();
}
