//! # Dinner Configuration
//!
//! [`DinnerConfig`] says how many philosophers sit down, how many cycles each runs,
//! and how long a hungry philosopher waits before giving up. It is `serde`-friendly
//! so it can live in any config file format, and [`DinnerConfig::from_env`] reads it
//! from environment variables for the binary:
//!
//! | Variable                   | Meaning                         | Default |
//! |----------------------------|---------------------------------|---------|
//! | `DINING_PHILOSOPHERS`      | number of seats (>= 2)          | 5       |
//! | `DINING_CYCLES`            | cycles per philosopher, or `forever` | 1  |
//! | `DINING_HUNGRY_TIMEOUT_MS` | give up waiting after this long | none    |

use crate::table::TableError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const PHILOSOPHERS_VAR: &str = "DINING_PHILOSOPHERS";
pub const CYCLES_VAR: &str = "DINING_CYCLES";
pub const HUNGRY_TIMEOUT_VAR: &str = "DINING_HUNGRY_TIMEOUT_MS";

/// How long each philosopher keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cycles {
    /// Stop after this many THINKING → … → THINKING cycles.
    Bounded(u64),
    /// Keep going until the dinner is shut down.
    Unbounded,
}

impl Cycles {
    /// Whether another cycle may start after `started` have.
    pub fn allows(self, started: u64) -> bool {
        match self {
            Cycles::Bounded(limit) => started < limit,
            Cycles::Unbounded => true,
        }
    }
}

impl Default for Cycles {
    fn default() -> Self {
        Cycles::Bounded(1)
    }
}

/// Errors detected before any philosopher sits down.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("A dinner needs at least 2 philosophers, got {0}")]
    TooFewPhilosophers(usize),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Everything the [`Dispatcher`](crate::lifecycle::Dispatcher) needs to set the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DinnerConfig {
    pub philosophers: usize,
    pub cycles: Cycles,
    pub hungry_timeout: Option<Duration>,
}

impl Default for DinnerConfig {
    fn default() -> Self {
        Self {
            philosophers: 5,
            cycles: Cycles::default(),
            hungry_timeout: None,
        }
    }
}

impl DinnerConfig {
    pub fn new(philosophers: usize) -> Self {
        Self {
            philosophers,
            ..Default::default()
        }
    }

    pub fn cycles(mut self, cycles: u64) -> Self {
        self.cycles = Cycles::Bounded(cycles);
        self
    }

    pub fn forever(mut self) -> Self {
        self.cycles = Cycles::Unbounded;
        self
    }

    pub fn hungry_timeout(mut self, timeout: Duration) -> Self {
        self.hungry_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.philosophers < 2 {
            return Err(ConfigError::TooFewPhilosophers(self.philosophers));
        }
        Ok(())
    }

    /// Reads the `DINING_*` variables on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env), with variables coming from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(PHILOSOPHERS_VAR) {
            config.philosophers = parse(PHILOSOPHERS_VAR, &value)?;
        }
        if let Some(value) = lookup(CYCLES_VAR) {
            config.cycles = match value.trim() {
                "forever" => Cycles::Unbounded,
                n => Cycles::Bounded(parse(CYCLES_VAR, n)?),
            };
        }
        if let Some(value) = lookup(HUNGRY_TIMEOUT_VAR) {
            let millis: u64 = parse(HUNGRY_TIMEOUT_VAR, &value)?;
            config.hungry_timeout = Some(Duration::from_millis(millis));
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DinnerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DinnerConfig::default());
        assert_eq!(config.philosophers, 5);
        assert_eq!(config.cycles, Cycles::Bounded(1));
    }

    #[test]
    fn test_reads_all_variables() {
        let config = DinnerConfig::from_lookup(lookup(&[
            (PHILOSOPHERS_VAR, "7"),
            (CYCLES_VAR, "forever"),
            (HUNGRY_TIMEOUT_VAR, "250"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            DinnerConfig::new(7)
                .forever()
                .hungry_timeout(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = DinnerConfig::from_lookup(lookup(&[(CYCLES_VAR, "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: CYCLES_VAR,
                value: "lots".into()
            }
        );

        let err = DinnerConfig::from_lookup(lookup(&[(PHILOSOPHERS_VAR, "1")])).unwrap_err();
        assert_eq!(err, ConfigError::TooFewPhilosophers(1));
    }

    #[test]
    fn test_cycles_allow() {
        assert!(Cycles::Bounded(2).allows(1));
        assert!(!Cycles::Bounded(2).allows(2));
        assert!(!Cycles::Bounded(0).allows(0));
        assert!(Cycles::Unbounded.allows(u64::MAX));
    }

    #[test]
    fn test_deserializes_partial_config() {
        let config: DinnerConfig =
            serde_json::from_str(r#"{ "philosophers": 3, "cycles": { "bounded": 4 } }"#).unwrap();
        assert_eq!(config, DinnerConfig::new(3).cycles(4));
    }
}
