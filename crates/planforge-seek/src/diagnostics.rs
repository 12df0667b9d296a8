//! RuleSeek run diagnostics
//!
//! Workers bump a private atomic counter per completed iteration; the
//! collector folds a counter into a cumulative total when its worker
//! retires, so the run-wide iteration count survives pool resizing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Point-in-time view of a run's progress.
#[derive(Debug, Clone, Default)]
pub struct SeekDiagnostics {
    /// Wall-clock time the run has been (or was) live.
    pub run_duration: Duration,
    /// Live workers with their iteration counts, in start order.
    pub live_iterations: Vec<(u64, u64)>,
    /// Iterations folded in from workers that already stopped.
    pub retired_iterations: u64,
    /// Time since the run's best score last changed, if one was found.
    pub time_since_best: Option<Duration>,
}

impl SeekDiagnostics {
    /// Live plus retired iterations.
    pub fn total_iterations(&self) -> u64 {
        self.retired_iterations
            + self
                .live_iterations
                .iter()
                .map(|(_, count)| count)
                .sum::<u64>()
    }

    /// Number of currently live workers.
    pub fn live_workers(&self) -> usize {
        self.live_iterations.len()
    }
}

struct WorkerCounter {
    worker: u64,
    iterations: Arc<AtomicU64>,
}

/// Thread-safe collector for one RuleSeek run.
pub struct DiagnosticsCollector {
    started_at: Instant,
    finished_at: Mutex<Option<Instant>>,
    retired_iterations: AtomicU64,
    live: Mutex<Vec<WorkerCounter>>,
    best_found_at: Mutex<Option<Instant>>,
}

impl DiagnosticsCollector {
    /// Creates a collector; the run clock starts now.
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            finished_at: Mutex::new(None),
            retired_iterations: AtomicU64::new(0),
            live: Mutex::new(Vec::new()),
            best_found_at: Mutex::new(None),
        }
    }

    /// Registers a worker and returns the counter it bumps per iteration.
    pub fn register_worker(&self, worker: u64) -> Arc<AtomicU64> {
        let iterations = Arc::new(AtomicU64::new(0));
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(WorkerCounter {
                worker,
                iterations: Arc::clone(&iterations),
            });
        iterations
    }

    /// Folds a worker's count into the retired total and drops its slot.
    /// Retiring an unknown worker is a no-op.
    pub fn retire_worker(&self, worker: u64) {
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(position) = live.iter().position(|c| c.worker == worker) {
            let counter = live.remove(position);
            let count = counter.iterations.load(Ordering::Relaxed);
            self.retired_iterations.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Records that the run's best score just changed.
    pub fn record_best(&self) {
        *self.best_found_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }

    /// Freezes the run clock; later snapshots stop growing the duration.
    pub fn mark_finished(&self) {
        let mut finished = self.finished_at.lock().unwrap_or_else(|e| e.into_inner());
        if finished.is_none() {
            *finished = Some(Instant::now());
        }
    }

    /// Time since the run started, frozen once [`Self::mark_finished`] ran.
    pub fn elapsed(&self) -> Duration {
        let finished = *self.finished_at.lock().unwrap_or_else(|e| e.into_inner());
        match finished {
            Some(at) => at.duration_since(self.started_at),
            None => self.started_at.elapsed(),
        }
    }

    /// Takes a snapshot of the current state without consuming the collector.
    pub fn snapshot(&self) -> SeekDiagnostics {
        let live_iterations = self
            .live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|c| (c.worker, c.iterations.load(Ordering::Relaxed)))
            .collect();
        let time_since_best = self
            .best_found_at
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .map(|at| at.elapsed());
        SeekDiagnostics {
            run_duration: self.elapsed(),
            live_iterations,
            retired_iterations: self.retired_iterations.load(Ordering::Relaxed),
            time_since_best,
        }
    }
}

impl Default for DiagnosticsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiagnosticsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("DiagnosticsCollector")
            .field("live_workers", &snapshot.live_workers())
            .field("total_iterations", &snapshot.total_iterations())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_roll_up_into_the_snapshot() {
        let collector = DiagnosticsCollector::new();
        let a = collector.register_worker(0);
        let b = collector.register_worker(1);
        a.fetch_add(3, Ordering::Relaxed);
        b.fetch_add(5, Ordering::Relaxed);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.live_iterations, [(0, 3), (1, 5)]);
        assert_eq!(snapshot.retired_iterations, 0);
        assert_eq!(snapshot.total_iterations(), 8);
        assert_eq!(snapshot.live_workers(), 2);
    }

    #[test]
    fn retiring_folds_the_count() {
        let collector = DiagnosticsCollector::new();
        let a = collector.register_worker(0);
        let b = collector.register_worker(1);
        a.fetch_add(4, Ordering::Relaxed);
        b.fetch_add(2, Ordering::Relaxed);

        collector.retire_worker(0);
        let snapshot = collector.snapshot();
        assert_eq!(snapshot.retired_iterations, 4);
        assert_eq!(snapshot.live_iterations, [(1, 2)]);
        assert_eq!(snapshot.total_iterations(), 6);

        // Unknown workers are ignored; retiring twice does not double-fold.
        collector.retire_worker(0);
        collector.retire_worker(7);
        assert_eq!(collector.snapshot().retired_iterations, 4);
    }

    #[test]
    fn best_marker_feeds_time_since_best() {
        let collector = DiagnosticsCollector::new();
        assert!(collector.snapshot().time_since_best.is_none());
        collector.record_best();
        assert!(collector.snapshot().time_since_best.is_some());
    }

    #[test]
    fn finishing_freezes_the_run_clock() {
        let collector = DiagnosticsCollector::new();
        collector.mark_finished();
        let first = collector.elapsed();
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(collector.elapsed(), first);
    }

    #[test]
    fn counters_are_thread_safe() {
        let collector = DiagnosticsCollector::new();
        let counters: Vec<_> = (0..4).map(|id| collector.register_worker(id)).collect();

        rayon::scope(|s| {
            for counter in &counters {
                s.spawn(move |_| {
                    for _ in 0..1000 {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });

        assert_eq!(collector.snapshot().total_iterations(), 4000);
        for id in 0..4 {
            collector.retire_worker(id);
        }
        let snapshot = collector.snapshot();
        assert_eq!(snapshot.retired_iterations, 4000);
        assert_eq!(snapshot.live_workers(), 0);
    }
}
