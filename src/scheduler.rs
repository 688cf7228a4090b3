use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicU64};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler thread is no longer running")]
    Stopped,
}

struct Entry {
    deadline: Instant,
    seq: u64,
    action: Box<dyn FnOnce() + Send>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Deadline first, submission order as tiebreak.
        self.deadline
            .cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Fire-and-forget executor for deferred actions. Each scheduled action
/// fires independently once its deadline passes; actions with equal or
/// increasing delays fire in submission order. There is no cancellation.
#[derive(Clone)]
pub struct Scheduler {
    tx: Sender<Entry>,
    seq: Arc<AtomicU64>,
}

impl Scheduler {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam::channel::unbounded();

        std::thread::spawn(move || {
            scheduler_thread(rx);
        });

        Self {
            tx,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn schedule(
        &self,
        delay: Duration,
        action: impl FnOnce() + Send + 'static,
    ) -> Result<(), SchedulerError> {
        let entry = Entry {
            deadline: Instant::now() + delay,
            seq: self.seq.fetch_add(1, atomic::Ordering::Relaxed),
            action: Box::new(action),
        };
        self.tx.send(entry).map_err(|_| SchedulerError::Stopped)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn scheduler_thread(rx: Receiver<Entry>) {
    let mut pending: BinaryHeap<Reverse<Entry>> = BinaryHeap::new();

    loop {
        let wait = pending
            .peek()
            .map(|Reverse(e)| e.deadline.saturating_duration_since(Instant::now()));

        match wait {
            None => match rx.recv() {
                Ok(entry) => pending.push(Reverse(entry)),
                Err(_) => break,
            },
            Some(wait) if wait.is_zero() => {
                if let Some(Reverse(entry)) = pending.pop() {
                    (entry.action)();
                }
            }
            Some(wait) => match rx.recv_timeout(wait) {
                Ok(entry) => pending.push(Reverse(entry)),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    drain(pending);
                    break;
                }
            },
        }
    }
    debug!("scheduler thread exiting");
}

/// All handles are gone but already-accepted actions still fire at their
/// deadlines before the thread exits.
fn drain(mut pending: BinaryHeap<Reverse<Entry>>) {
    while let Some(Reverse(entry)) = pending.pop() {
        let now = Instant::now();
        if entry.deadline > now {
            std::thread::sleep(entry.deadline - now);
        }
        (entry.action)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording_action(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> impl FnOnce() + Send + 'static {
        let log = log.clone();
        move || log.lock().push(tag)
    }

    #[test]
    fn actions_fire_in_delay_order() {
        let scheduler = Scheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        scheduler
            .schedule(Duration::from_millis(60), recording_action(&log, "late"))
            .unwrap();
        scheduler
            .schedule(Duration::from_millis(10), recording_action(&log, "early"))
            .unwrap();
        scheduler
            .schedule(Duration::from_millis(35), recording_action(&log, "middle"))
            .unwrap();

        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(*log.lock(), vec!["early", "middle", "late"]);
    }

    #[test]
    fn equal_delays_fire_in_submission_order() {
        let scheduler = Scheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b", "c", "d"] {
            scheduler
                .schedule(Duration::from_millis(20), recording_action(&log, tag))
                .unwrap();
        }

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(*log.lock(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn pending_actions_survive_handle_drop() {
        let log = Arc::new(Mutex::new(Vec::new()));

        {
            let scheduler = Scheduler::new();
            scheduler
                .schedule(Duration::from_millis(30), recording_action(&log, "fired"))
                .unwrap();
        }

        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(*log.lock(), vec!["fired"]);
    }

    #[test]
    fn zero_delay_fires_promptly() {
        let scheduler = Scheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        scheduler
            .schedule(Duration::ZERO, recording_action(&log, "now"))
            .unwrap();

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(*log.lock(), vec!["now"]);
    }
}
