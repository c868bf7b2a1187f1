//! # Behavior Hooks
//!
//! A [`Behavior`] is what a philosopher *does* while it holds its forks. The table
//! and the state machine don't care: hooks are side effects only, and nothing they
//! return is fed back into synchronization, except that an `Err` ends that
//! philosopher's run.
//!
//! All five hooks are **provided methods** returning `Ok(())`, so an implementation
//! only overrides what it needs. `()` is the do-nothing behavior.
//!
//! A hook runs while both forks are held. A hook that never returns starves the two
//! neighbours; it cannot deadlock the table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Names the five hooks, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hook {
    PickLeft,
    PickRight,
    Eat,
    PutLeft,
    PutRight,
}

impl Hook {
    pub const ALL: [Hook; 5] = [
        Hook::PickLeft,
        Hook::PickRight,
        Hook::Eat,
        Hook::PutLeft,
        Hook::PutRight,
    ];
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hook::PickLeft => "pick_left",
            Hook::PickRight => "pick_right",
            Hook::Eat => "eat",
            Hook::PutLeft => "put_left",
            Hook::PutRight => "put_right",
        };
        f.write_str(name)
    }
}

/// Per-transition callbacks supplied by the caller.
///
/// # Error Type
/// Each behavior picks its own error type. The philosopher boxes it into
/// [`PhilosopherError::Hook`](crate::philosopher::PhilosopherError::Hook) together with
/// the philosopher id and the hook that failed.
#[async_trait]
pub trait Behavior: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn pick_left(&self, _philosopher: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn pick_right(&self, _philosopher: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    /// The meal itself.
    async fn eat(&self, _philosopher: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn put_left(&self, _philosopher: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn put_right(&self, _philosopher: usize) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Runs `hook` of `behavior` for `philosopher`.
pub(crate) async fn call<B: Behavior + ?Sized>(
    behavior: &B,
    hook: Hook,
    philosopher: usize,
) -> Result<(), B::Error> {
    match hook {
        Hook::PickLeft => behavior.pick_left(philosopher).await,
        Hook::PickRight => behavior.pick_right(philosopher).await,
        Hook::Eat => behavior.eat(philosopher).await,
        Hook::PutLeft => behavior.put_left(philosopher).await,
        Hook::PutRight => behavior.put_right(philosopher).await,
    }
}

#[async_trait]
impl Behavior for () {
    type Error = Infallible;
}

/// Narrates the dinner through `tracing` and takes `eat_time` to eat.
#[derive(Debug, Clone, Default)]
pub struct Narrator {
    eat_time: Duration,
}

impl Narrator {
    pub fn new(eat_time: Duration) -> Self {
        Self { eat_time }
    }

    pub fn eat_time(&self) -> Duration {
        self.eat_time
    }
}

#[async_trait]
impl Behavior for Narrator {
    type Error = Infallible;

    async fn pick_left(&self, philosopher: usize) -> Result<(), Self::Error> {
        info!(philosopher, "Picked up left fork");
        Ok(())
    }

    async fn pick_right(&self, philosopher: usize) -> Result<(), Self::Error> {
        info!(philosopher, "Picked up right fork");
        Ok(())
    }

    async fn eat(&self, philosopher: usize) -> Result<(), Self::Error> {
        info!(philosopher, eat_time = ?self.eat_time, "Eating");
        if !self.eat_time.is_zero() {
            tokio::time::sleep(self.eat_time).await;
        }
        Ok(())
    }

    async fn put_left(&self, philosopher: usize) -> Result<(), Self::Error> {
        info!(philosopher, "Put down left fork");
        Ok(())
    }

    async fn put_right(&self, philosopher: usize) -> Result<(), Self::Error> {
        info!(philosopher, "Put down right fork");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_unit_behavior_does_nothing() {
        for hook in Hook::ALL {
            assert!(call(&(), hook, 0).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_narrator_takes_its_time_to_eat() {
        let narrator = Narrator::new(Duration::from_millis(20));
        let started = Instant::now();
        for hook in Hook::ALL {
            call(&narrator, hook, 3).await.unwrap();
        }
        assert!(started.elapsed() >= narrator.eat_time());
    }

    #[test]
    fn test_hook_names() {
        let names: Vec<String> = Hook::ALL.iter().map(Hook::to_string).collect();
        assert_eq!(names, ["pick_left", "pick_right", "eat", "put_left", "put_right"]);
    }
}
