use crate::instrument::{EventKind, Observer, TracingObserver};
use crate::lifecycle::{ConfigError, DinnerConfig};
use crate::philosopher::{Behavior, Philosopher, PhilosopherError, PhilosopherReport};
use crate::table::ForkTable;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, info_span, Instrument};

/// Sets the table and seats the philosophers.
///
/// `Dispatcher` is responsible for:
/// - **Validation**: rejecting a dinner of fewer than two philosophers before anything runs
/// - **Ownership**: building the one [`ForkTable`] every philosopher shares (no globals)
/// - **Spawning**: one Tokio task per philosopher, all running in parallel
///
/// # Example
///
/// ```ignore
/// let dispatcher = Dispatcher::new(DinnerConfig::new(5).cycles(3), Narrator::default())?;
///
/// // Run to completion
/// let report = dispatcher.run().await;
/// assert!(report.is_success());
/// ```
pub struct Dispatcher<B: Behavior> {
    config: DinnerConfig,
    table: Arc<ForkTable>,
    behavior: Arc<B>,
    philosophers: Vec<Philosopher>,
    stop: watch::Sender<bool>,
}

impl<B: Behavior> Dispatcher<B> {
    /// Creates a dispatcher whose table reports to a [`TracingObserver`].
    pub fn new(config: DinnerConfig, behavior: B) -> Result<Self, ConfigError> {
        Self::with_observer(config, behavior, Arc::new(TracingObserver))
    }

    /// Creates a dispatcher whose table reports every event to `observer`.
    pub fn with_observer(
        config: DinnerConfig,
        behavior: B,
        observer: Arc<dyn Observer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = Arc::new(ForkTable::with_observer(config.philosophers, observer)?);
        let (stop, stop_rx) = watch::channel(false);
        let philosophers = (0..config.philosophers)
            .map(|id| -> Result<Philosopher, ConfigError> {
                Ok(Philosopher::new(id, table.clone())?.with_stop(stop_rx.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            table,
            behavior: Arc::new(behavior),
            philosophers,
            stop,
        })
    }

    pub fn config(&self) -> &DinnerConfig {
        &self.config
    }

    pub fn table(&self) -> &Arc<ForkTable> {
        &self.table
    }

    /// Spawns every philosopher and returns the running [`Dinner`].
    ///
    /// Must be called from within a Tokio runtime. Use a multi-threaded one to get
    /// real parallelism.
    pub fn start(self) -> Dinner {
        let Self {
            config,
            table,
            behavior,
            philosophers,
            stop,
        } = self;

        info!(
            philosophers = config.philosophers,
            cycles = ?config.cycles,
            hungry_timeout = ?config.hungry_timeout,
            "Dinner started"
        );

        // 1. Spawn one task per seat, each inside its own span
        let handles = philosophers
            .into_iter()
            .map(|philosopher| {
                let id = philosopher.id();
                let span = info_span!("philosopher", id);
                let task = philosopher
                    .run(behavior.clone(), config.cycles, config.hungry_timeout)
                    .instrument(span);
                (id, tokio::spawn(task))
            })
            .collect();

        // 2. Hand the stop signal and the handles to the caller
        Dinner {
            table,
            stop,
            handles,
        }
    }

    /// Runs the dinner to completion. Shorthand for `start().join()`.
    pub async fn run(self) -> DinnerReport {
        self.start().join().await
    }
}

type PhilosopherTask = JoinHandle<Result<PhilosopherReport, PhilosopherError>>;

/// A dinner in progress.
///
/// Dropping it without [`join`](Dinner::join) or [`shutdown`](Dinner::shutdown)
/// stops every philosopher, but nobody collects their reports.
pub struct Dinner {
    table: Arc<ForkTable>,
    stop: watch::Sender<bool>,
    handles: Vec<(usize, PhilosopherTask)>,
}

impl Dinner {
    pub fn table(&self) -> &Arc<ForkTable> {
        &self.table
    }

    /// Asks every philosopher to leave: no new cycle starts and hungry waits end.
    /// Meals already being eaten are finished.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Waits for every philosopher and collects the outcome.
    ///
    /// A failed or panicked philosopher never stops the others from being awaited.
    pub async fn join(self) -> DinnerReport {
        let mut report = DinnerReport::default();

        for (philosopher, handle) in self.handles {
            match handle.await {
                Ok(Ok(done)) => report.reports.push(done),
                Ok(Err(failure)) => report.failures.push(failure),
                Err(join_error) => {
                    let message = join_message(join_error);
                    error!(philosopher, %message, "Philosopher task failed");
                    self.table.observe(EventKind::Failed, philosopher, None);
                    report.failures.push(PhilosopherError::Panicked {
                        philosopher,
                        message,
                    });
                }
            }
        }

        info!(
            meals = report.meals(),
            timeouts = report.timeouts(),
            failures = report.failures.len(),
            "Dinner over"
        );
        report
    }

    /// Stops the dinner and waits for everyone to leave.
    pub async fn shutdown(self) -> DinnerReport {
        info!("Shutting down dinner...");
        self.stop();
        self.join().await
    }
}

fn join_message(join_error: JoinError) -> String {
    if join_error.is_cancelled() {
        return "task was cancelled".to_string();
    }
    let payload: Box<dyn Any + Send> = join_error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Aggregate outcome of a dinner, in seat order.
#[derive(Debug, Default)]
pub struct DinnerReport {
    pub reports: Vec<PhilosopherReport>,
    pub failures: Vec<PhilosopherError>,
}

impl DinnerReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn meals(&self) -> u64 {
        self.reports.iter().map(|r| r.meals).sum()
    }

    pub fn timeouts(&self) -> u64 {
        self.reports.iter().map(|r| r.timeouts).sum()
    }

    pub fn report(&self, philosopher: usize) -> Option<&PhilosopherReport> {
        self.reports.iter().find(|r| r.philosopher == philosopher)
    }

    pub fn failure(&self, philosopher: usize) -> Option<&PhilosopherError> {
        self.failures.iter().find(|f| f.philosopher() == philosopher)
    }

    /// Every report, or the failure of the lowest-numbered failed philosopher.
    pub fn into_result(self) -> Result<Vec<PhilosopherReport>, PhilosopherError> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure),
            None => Ok(self.reports),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::Recorder;

    #[test]
    fn test_rejects_a_lonely_philosopher() {
        for n in [0, 1] {
            let err = Dispatcher::new(DinnerConfig::new(n), ()).err();
            assert_eq!(err, Some(ConfigError::TooFewPhilosophers(n)));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_to_completion() {
        let recorder = Arc::new(Recorder::new());
        let dispatcher =
            Dispatcher::with_observer(DinnerConfig::new(4).cycles(10), (), recorder.clone())
                .unwrap();
        let table = dispatcher.table().clone();

        let report = dispatcher.run().await;
        assert!(report.is_success());
        assert_eq!(report.meals(), 40);
        assert_eq!(report.report(3).map(|r| r.meals), Some(10));
        assert_eq!(recorder.count(EventKind::Finished), 4);
        assert!(table.all_free());

        let reports = report.into_result().unwrap();
        assert_eq!(reports.len(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shutdown_ends_an_endless_dinner() {
        let dispatcher = Dispatcher::new(DinnerConfig::new(5).forever(), ()).unwrap();
        let dinner = dispatcher.start();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let report = dinner.shutdown().await;
        assert!(report.is_success());
        assert_eq!(report.reports.len(), 5);
        assert!(report.meals() > 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_dropping_a_dinner_stops_everyone() {
        let recorder = Arc::new(Recorder::new());
        let dispatcher =
            Dispatcher::with_observer(DinnerConfig::new(3).forever(), (), recorder.clone())
                .unwrap();
        let dinner = dispatcher.start();
        let table = dinner.table().clone();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        drop(dinner);

        let everyone_left = async {
            while recorder.count(EventKind::Finished) < 3 {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(std::time::Duration::from_secs(5), everyone_left)
            .await
            .expect("philosophers kept eating after the dinner was dropped");

        let eaten = recorder.count(EventKind::Eating);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(recorder.count(EventKind::Eating), eaten);
        assert!(table.all_free());
    }
}
