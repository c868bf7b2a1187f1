//! In-memory observer for tests and post-mortems.

use crate::instrument::{Event, EventKind, Observer};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Keeps every [`Event`] in arrival order.
///
/// The table reports `Acquired` while the fork lock is held and `Released` before the
/// lock is given up, so the position of an event in this log is a valid linearization:
/// a neighbour's `Acquired` for a fork always lands after the previous holder's
/// `Released`. The analysis helpers below work on positions, not timestamps.
#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<Event> {
        self.log().clone()
    }

    pub fn len(&self) -> usize {
        self.log().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log().is_empty()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.log().iter().filter(|e| e.kind == kind).count()
    }

    pub fn count_for(&self, philosopher: usize, kind: EventKind) -> usize {
        self.log()
            .iter()
            .filter(|e| e.kind == kind && e.philosopher == philosopher)
            .count()
    }

    /// Forks taken by `philosopher`, in the order it took them.
    pub fn acquisitions(&self, philosopher: usize) -> Vec<usize> {
        self.log()
            .iter()
            .filter(|e| e.kind == EventKind::Acquired && e.philosopher == philosopher)
            .filter_map(|e| e.fork)
            .collect()
    }

    /// Highest number of simultaneous holders `fork` ever had. Must never exceed 1.
    pub fn max_holders(&self, fork: usize) -> usize {
        let mut holders = 0usize;
        let mut max = 0;
        for event in self.log().iter().filter(|e| e.fork == Some(fork)) {
            match event.kind {
                EventKind::Acquired => {
                    holders += 1;
                    max = max.max(holders);
                }
                EventKind::Released => holders = holders.saturating_sub(1),
                _ => {}
            }
        }
        max
    }

    /// Highest number of philosophers eating at once.
    ///
    /// A meal spans from `Eating` to the philosopher's first `Released` after it.
    pub fn max_concurrent_eaters(&self) -> usize {
        let mut eating = HashSet::new();
        let mut max = 0;
        for event in self.log().iter() {
            match event.kind {
                EventKind::Eating => {
                    eating.insert(event.philosopher);
                    max = max.max(eating.len());
                }
                EventKind::Released => {
                    eating.remove(&event.philosopher);
                }
                _ => {}
            }
        }
        max
    }

    /// Log positions spanned by each of `philosopher`'s meals.
    pub fn eating_intervals(&self, philosopher: usize) -> Vec<Range<usize>> {
        let log = self.log();
        let mut intervals = Vec::new();
        let mut start = None;
        for (position, event) in log.iter().enumerate() {
            if event.philosopher != philosopher {
                continue;
            }
            match (event.kind, start) {
                (EventKind::Eating, None) => start = Some(position),
                (EventKind::Released, Some(begin)) => {
                    intervals.push(begin..position);
                    start = None;
                }
                _ => {}
            }
        }
        intervals
    }

    pub fn clear(&self) {
        self.log().clear();
    }
}

impl Observer for Recorder {
    fn observe(&self, event: &Event) {
        self.log().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn event(kind: EventKind, philosopher: usize, fork: Option<usize>) -> Event {
        Event {
            kind,
            philosopher,
            fork,
            at: Duration::ZERO,
        }
    }

    #[test]
    fn test_meal_analysis() {
        let recorder = Recorder::new();
        for e in [
            event(EventKind::Acquired, 0, Some(0)),
            event(EventKind::Acquired, 0, Some(1)),
            event(EventKind::Eating, 0, None),
            event(EventKind::Acquired, 2, Some(2)),
            event(EventKind::Acquired, 2, Some(3)),
            event(EventKind::Eating, 2, None),
            event(EventKind::Released, 0, Some(1)),
            event(EventKind::Released, 0, Some(0)),
            event(EventKind::Released, 2, Some(3)),
            event(EventKind::Released, 2, Some(2)),
        ] {
            recorder.observe(&e);
        }

        assert_eq!(recorder.len(), 10);
        assert_eq!(recorder.count(EventKind::Eating), 2);
        assert_eq!(recorder.count_for(2, EventKind::Released), 2);
        assert_eq!(recorder.acquisitions(2), vec![2, 3]);
        assert_eq!(recorder.max_holders(1), 1);
        assert_eq!(recorder.max_concurrent_eaters(), 2);
        assert_eq!(recorder.eating_intervals(0), vec![2..6]);
        assert_eq!(recorder.eating_intervals(2), vec![5..8]);
    }

    #[test]
    fn test_double_holder_is_visible() {
        let recorder = Recorder::new();
        recorder.observe(&event(EventKind::Acquired, 0, Some(1)));
        recorder.observe(&event(EventKind::Acquired, 1, Some(1)));
        assert_eq!(recorder.max_holders(1), 2);

        recorder.clear();
        assert!(recorder.is_empty());
    }
}
