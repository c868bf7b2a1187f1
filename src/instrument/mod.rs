//! # Instrumentation
//!
//! Every state transition of a philosopher and every fork acquire/release is reported
//! to an [`Observer`]. Observers are purely additive: the protocol is correct with or
//! without them, and they must not block.
//!
//! - [`TracingObserver`] turns events into structured `tracing` records (the default).
//! - [`Recorder`] keeps them in memory so tests can check mutual exclusion, ordering,
//!   balance and the capacity bound after the fact.
//!
//! [`Event`] is `serde`-serializable, so a custom observer can ship it anywhere.

pub mod event;
pub mod recorder;

pub use event::*;
pub use recorder::*;

use tracing::{debug, info, trace, warn};

/// Sink for [`Event`]s.
///
/// Called from inside the protocol (some events while a fork lock is held), so
/// implementations should return quickly.
pub trait Observer: Send + Sync + 'static {
    fn observe(&self, event: &Event);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&self, _event: &Event) {}
}

/// Logs events through `tracing`.
///
/// Fork traffic goes to `trace`, state changes to `debug`, and the end of a
/// philosopher's run to `info`/`warn`. Run with `RUST_LOG=debug` to watch the dinner.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, event: &Event) {
        let Event {
            kind,
            philosopher,
            fork,
            at,
        } = event;
        match kind {
            EventKind::Acquired | EventKind::Released => {
                trace!(philosopher, fork, ?at, %kind, "Fork")
            }
            EventKind::Thinking | EventKind::Hungry | EventKind::Eating => {
                debug!(philosopher, ?at, %kind, "State")
            }
            EventKind::TimedOut => info!(philosopher, ?at, "Gave up waiting for forks"),
            EventKind::Finished => info!(philosopher, ?at, "Finished"),
            EventKind::Failed => warn!(philosopher, ?at, "Failed"),
        }
    }
}
