//! # Dining Table Demo
//!
//! Sets a table, runs the dinner with a [`Narrator`] and prints what everyone ate.
//!
//! Configuration comes from the environment (see
//! [`DinnerConfig::from_env`](dining_table::lifecycle::DinnerConfig::from_env)), plus
//! `DINING_EAT_MS` for how long each meal takes. With `DINING_CYCLES=forever` the
//! dinner runs until Ctrl-C.

use dining_table::lifecycle::{setup_tracing, Cycles, DinnerConfig, Dispatcher};
use dining_table::philosopher::Narrator;
use std::time::Duration;
use tracing::{error, info};

const EAT_TIME_VAR: &str = "DINING_EAT_MS";

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = DinnerConfig::from_env().map_err(|e| e.to_string())?;
    let eat_time = match std::env::var(EAT_TIME_VAR) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Duration::from_millis)
            .map_err(|_| format!("Invalid value for {}: {:?}", EAT_TIME_VAR, value))?,
        Err(_) => Duration::from_millis(10),
    };

    info!(philosophers = config.philosophers, ?eat_time, "Setting the table");
    let endless = config.cycles == Cycles::Unbounded;
    let dispatcher = Dispatcher::new(config, Narrator::new(eat_time)).map_err(|e| e.to_string())?;
    let dinner = dispatcher.start();

    let report = if endless {
        tokio::signal::ctrl_c().await.map_err(|e| e.to_string())?;
        dinner.shutdown().await
    } else {
        dinner.join().await
    };

    for done in &report.reports {
        info!(
            philosopher = done.philosopher,
            meals = done.meals,
            timeouts = done.timeouts,
            "Left the table"
        );
    }
    for failure in &report.failures {
        error!(error = %failure, "Philosopher failed");
    }

    report
        .into_result()
        .map(|_| info!("Dinner completed successfully"))
        .map_err(|e| e.to_string())
}
