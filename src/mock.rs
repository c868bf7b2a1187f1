//! # Mock Behavior & Testing Guide
//!
//! [`MockBehavior`] is a scriptable [`Behavior`] for tests. By default every hook
//! succeeds instantly; per philosopher and hook you can make it fail, panic, or take
//! its time. It records every call so tests can assert on what actually ran.
//!
//! ## When to use Mocks vs Real Behaviors
//!
//! | Feature | MockBehavior | Narrator / your own |
//! |---------|--------------|---------------------|
//! | **Speed** | Instant unless told to sleep | Whatever the hooks do |
//! | **Failure injection** | One line (`return_err`, `panic`) | Needs a purpose-built behavior |
//! | **Call log** | Built in | None |
//! | **Use Case** | Protocol and dispatcher tests | Demos, real workloads |
//!
//! ## Example
//!
//! ```rust
//! use dining_table::lifecycle::{DinnerConfig, Dispatcher};
//! use dining_table::mock::MockBehavior;
//! use dining_table::philosopher::Hook;
//!
//! #[tokio::main]
//! async fn main() {
//!     // 1. Script the failure
//!     let mut mock = MockBehavior::new();
//!     mock.expect(2, Hook::Eat).return_err("choked");
//!
//!     // 2. Run a dinner with it
//!     let dispatcher = Dispatcher::new(DinnerConfig::new(5), mock.clone()).unwrap();
//!     let table = dispatcher.table().clone();
//!     let report = dispatcher.run().await;
//!
//!     // 3. Philosopher 2 failed, everyone else ate, no fork is left held
//!     assert_eq!(report.failures.len(), 1);
//!     assert_eq!(report.meals(), 4);
//!     assert!(table.all_free());
//!
//!     // 4. Every scripted response fired
//!     mock.verify();
//! }
//! ```

use crate::philosopher::{Behavior, Hook};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Error returned by a hook scripted with [`HookExpectationBuilder::return_err`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Scripted failure: {0}")]
pub struct MockHookError(pub String);

#[derive(Debug, Clone)]
enum Response {
    Fail(String),
    Panic(String),
    Delay(Duration),
}

#[derive(Debug)]
struct Script {
    philosopher: usize,
    hook: Hook,
    response: Response,
    fired: usize,
}

#[derive(Debug, Default)]
struct MockState {
    scripts: Vec<Script>,
    calls: Vec<(usize, Hook)>,
}

/// A [`Behavior`] with scripted responses and a call log.
///
/// Clones share state: hand one clone to the dispatcher and keep another to inspect.
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    state: Arc<Mutex<MockState>>,
}

impl MockBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Scripts the response of `hook` for `philosopher`. Unscripted hooks succeed.
    pub fn expect(&mut self, philosopher: usize, hook: Hook) -> HookExpectationBuilder {
        HookExpectationBuilder {
            philosopher,
            hook,
            state: self.state.clone(),
        }
    }

    /// Every hook call, in the order they happened.
    pub fn calls(&self) -> Vec<(usize, Hook)> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, philosopher: usize, hook: Hook) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|&&call| call == (philosopher, hook))
            .count()
    }

    /// Panics unless every scripted response fired at least once.
    pub fn verify(&self) {
        let state = self.lock();
        let unused: Vec<_> = state
            .scripts
            .iter()
            .filter(|s| s.fired == 0)
            .map(|s| (s.philosopher, s.hook))
            .collect();
        if !unused.is_empty() {
            panic!("Not all expectations were met: {:?}", unused);
        }
    }

    async fn respond(&self, philosopher: usize, hook: Hook) -> Result<(), MockHookError> {
        let response = {
            let mut state = self.lock();
            state.calls.push((philosopher, hook));
            state
                .scripts
                .iter_mut()
                .find(|s| s.philosopher == philosopher && s.hook == hook)
                .map(|script| {
                    script.fired += 1;
                    script.response.clone()
                })
        };

        match response {
            None => Ok(()),
            Some(Response::Fail(message)) => Err(MockHookError(message)),
            Some(Response::Panic(message)) => panic!("{}", message),
            Some(Response::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

/// Builder for one scripted hook response.
pub struct HookExpectationBuilder {
    philosopher: usize,
    hook: Hook,
    state: Arc<Mutex<MockState>>,
}

impl HookExpectationBuilder {
    fn push(self, response: Response) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.scripts.push(Script {
            philosopher: self.philosopher,
            hook: self.hook,
            response,
            fired: 0,
        });
    }

    /// The hook returns `Err(MockHookError(message))`.
    pub fn return_err(self, message: impl Into<String>) {
        self.push(Response::Fail(message.into()));
    }

    /// The hook panics with `message`.
    pub fn panic(self, message: impl Into<String>) {
        self.push(Response::Panic(message.into()));
    }

    /// The hook sleeps for `delay`, then succeeds.
    pub fn delay(self, delay: Duration) {
        self.push(Response::Delay(delay));
    }
}

#[async_trait]
impl Behavior for MockBehavior {
    type Error = MockHookError;

    async fn pick_left(&self, philosopher: usize) -> Result<(), Self::Error> {
        self.respond(philosopher, Hook::PickLeft).await
    }

    async fn pick_right(&self, philosopher: usize) -> Result<(), Self::Error> {
        self.respond(philosopher, Hook::PickRight).await
    }

    async fn eat(&self, philosopher: usize) -> Result<(), Self::Error> {
        self.respond(philosopher, Hook::Eat).await
    }

    async fn put_left(&self, philosopher: usize) -> Result<(), Self::Error> {
        self.respond(philosopher, Hook::PutLeft).await
    }

    async fn put_right(&self, philosopher: usize) -> Result<(), Self::Error> {
        self.respond(philosopher, Hook::PutRight).await
    }
}
