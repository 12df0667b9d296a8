//! Run status and progress reporting
//!
//! Progress is sampled on percent thresholds rather than per commit so
//! large scenarios do not drown their listeners. The denominator (total
//! schedulable activities) can move mid-run when activities auto-split or
//! auto-join, so every sample recomputes the percentage from the current
//! totals instead of counting steps.

use std::sync::Mutex;

/// Lifecycle of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStatus {
    Initializing,
    Started,
    Scheduling,
    Complete,
    PostSimulationWorkComplete,
    /// Pre-start validation failed; the loop never ran.
    Terminated,
    /// Unhandled fault mid-run; the partial schedule is retained.
    Exception,
}

/// Progress report published through a [`ProgressSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub status: SimulationStatus,
    /// Percent of schedulable activities committed, 0..=100.
    pub percent: u8,
    /// Caller-assigned run number, echoed on every event of the run.
    pub simulation_number: u64,
}

/// Receives progress events from a running simulation.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: ProgressEvent);
}

/// Sink discarding every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn publish(&self, _event: ProgressEvent) {}
}

/// Sink retaining every event, for tests and engineering diagnosis.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ProgressSink for MemorySink {
    fn publish(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

/// Percent-threshold sampler.
#[derive(Debug)]
pub struct ProgressSampler {
    step_percent: u8,
    last_emitted: u8,
}

impl ProgressSampler {
    /// Creates a sampler emitting roughly every `step_percent` of total
    /// progress. The step is clamped into 1..=100.
    pub fn new(step_percent: u8) -> Self {
        Self {
            step_percent: step_percent.clamp(1, 100),
            last_emitted: 0,
        }
    }

    /// Returns the percentage to report when `completed / total` has
    /// crossed the next threshold, recomputed from the current denominator.
    /// Emitted percentages never decrease even if the denominator grows.
    pub fn sample(&mut self, completed: usize, total: usize) -> Option<u8> {
        if total == 0 {
            return None;
        }
        let percent = ((completed * 100) / total).min(100) as u8;
        if percent >= self.last_emitted.saturating_add(self.step_percent) {
            self.last_emitted = percent;
            return Some(percent);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_on_threshold_crossings_only() {
        let mut sampler = ProgressSampler::new(25);
        assert_eq!(sampler.sample(1, 10), None);
        assert_eq!(sampler.sample(2, 10), None);
        assert_eq!(sampler.sample(3, 10), Some(30));
        assert_eq!(sampler.sample(4, 10), None);
        assert_eq!(sampler.sample(6, 10), Some(60));
        assert_eq!(sampler.sample(10, 10), Some(100));
    }

    #[test]
    fn growing_denominator_defers_the_next_emit() {
        let mut sampler = ProgressSampler::new(20);
        assert_eq!(sampler.sample(2, 10), Some(20));
        // Auto-split grew the denominator: 3/15 is back at 20%, below the
        // next 40% threshold.
        assert_eq!(sampler.sample(3, 15), None);
        assert_eq!(sampler.sample(6, 15), Some(40));
    }

    #[test]
    fn shrinking_denominator_can_jump_thresholds() {
        let mut sampler = ProgressSampler::new(20);
        assert_eq!(sampler.sample(1, 10), None);
        // Auto-join shrank the denominator; a single commit may now cross
        // several thresholds at once and reports the current percentage.
        assert_eq!(sampler.sample(4, 5), Some(80));
        assert_eq!(sampler.sample(5, 5), Some(100));
    }

    #[test]
    fn empty_denominator_never_emits() {
        let mut sampler = ProgressSampler::new(10);
        assert_eq!(sampler.sample(0, 0), None);
    }
}
