//! RuleSeek session lifecycle
//!
//! A session owns one search over a baseline scenario: an admission thread
//! sizes the worker pool against a [`CpuBudget`] on a fixed tick, workers
//! race perturbed scheduling passes, and improving results stream to the
//! receiver handed out at construction. Everything validated up front
//! (configuration, KPI name) fails synchronously before any thread starts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use planforge_config::SeekConfig;
use planforge_core::{CancelToken, KpiCalculator, KpiRegistry, SnapshotService};

use crate::budget::{admission_action, throttle_delay, AdmissionAction, CpuBudget, FixedBudget};
use crate::delivery::{DeliveryQueue, Discovery};
use crate::diagnostics::{DiagnosticsCollector, SeekDiagnostics};
use crate::error::{Result, SeekError};
use crate::score::{RuleSeekScore, TopScores};
use crate::worker::{run_worker, WorkerContext};

/// State shared by the admission thread and every worker of one run.
pub(crate) struct RunShared {
    pub token: CancelToken,
    pub top: TopScores,
    pub delivery: DeliveryQueue,
    pub diagnostics: DiagnosticsCollector,
}

/// Handle on one RuleSeek search.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use planforge_config::SeekConfig;
/// use planforge_core::{CloneSnapshot, KpiRegistry, Scenario};
/// use planforge_seek::RuleSeekSession;
///
/// let config = SeekConfig::default()
///     .with_target_workers(1.0)
///     .with_admission_tick_ms(10);
/// let (mut session, _discoveries) = RuleSeekSession::new(
///     config,
///     &KpiRegistry::standard(),
///     Arc::new(CloneSnapshot::new(Scenario::new("baseline"))),
/// )?;
/// session.start()?;
/// assert!(session.is_running());
/// session.stop();
/// assert!(!session.is_running());
/// # Ok::<(), planforge_seek::SeekError>(())
/// ```
pub struct RuleSeekSession {
    config: SeekConfig,
    kpi: Arc<dyn KpiCalculator>,
    snapshot: Arc<dyn SnapshotService>,
    budget: Arc<dyn CpuBudget>,
    sender: UnboundedSender<Discovery>,
    /// Most recent run's shared state, kept for inspection after stop.
    shared: Option<Arc<RunShared>>,
    admission: Option<JoinHandle<()>>,
}

impl RuleSeekSession {
    /// Validates the configuration, resolves the target KPI, and returns
    /// the session paired with its discovery receiver.
    ///
    /// The budget defaults to the configured fixed worker target; swap it
    /// with [`Self::with_budget`] to follow machine load instead.
    pub fn new(
        config: SeekConfig,
        registry: &KpiRegistry,
        snapshot: Arc<dyn SnapshotService>,
    ) -> Result<(Self, UnboundedReceiver<Discovery>)> {
        config.validate()?;
        let kpi = registry.resolve(&config.kpi)?;
        let budget: Arc<dyn CpuBudget> = Arc::new(FixedBudget::new(config.target_workers));
        let (sender, receiver) = mpsc::unbounded_channel();
        let session = Self {
            config,
            kpi,
            snapshot,
            budget,
            sender,
            shared: None,
            admission: None,
        };
        Ok((session, receiver))
    }

    /// Replaces the fixed budget derived from the configuration.
    pub fn with_budget(mut self, budget: Arc<dyn CpuBudget>) -> Self {
        self.budget = budget;
        self
    }

    pub fn is_running(&self) -> bool {
        self.admission.is_some()
    }

    /// Launches the admission thread for a fresh run.
    ///
    /// Fails with [`SeekError::AlreadyRunning`] while a previous run is
    /// live; a finished run's results are discarded by the restart.
    pub fn start(&mut self) -> Result<()> {
        if self.admission.is_some() {
            return Err(SeekError::AlreadyRunning);
        }
        let session_seed = self.config.seed.unwrap_or_else(rand::random);
        let shared = Arc::new(RunShared {
            token: CancelToken::new(),
            top: TopScores::new(self.config.top_k, self.kpi.direction()),
            delivery: DeliveryQueue::new(self.sender.clone()),
            diagnostics: DiagnosticsCollector::new(),
        });
        info!(
            event = "seek_start",
            kpi = self.kpi.name(),
            target_workers = self.budget.target_workers(),
            top_k = self.config.top_k,
            seed = session_seed,
        );
        let admission = AdmissionLoop {
            shared: Arc::clone(&shared),
            config: self.config.clone(),
            budget: Arc::clone(&self.budget),
            snapshot: Arc::clone(&self.snapshot),
            kpi: Arc::clone(&self.kpi),
            session_seed,
            next_worker: 0,
            workers: Vec::new(),
            draining: Vec::new(),
            last_flush: Instant::now(),
        };
        self.shared = Some(shared);
        self.admission = Some(thread::spawn(move || admission.run()));
        Ok(())
    }

    /// Cancels the run and joins the admission thread and every worker.
    /// Results already computed stay readable; nothing further is
    /// delivered. Idempotent.
    pub fn stop(&mut self) {
        let Some(handle) = self.admission.take() else {
            return;
        };
        if let Some(shared) = &self.shared {
            shared.token.cancel();
        }
        let _ = handle.join();
        if let Some(shared) = &self.shared {
            let diagnostics = shared.diagnostics.snapshot();
            info!(
                event = "seek_stop",
                iterations = diagnostics.total_iterations(),
                duration_ms = diagnostics.run_duration.as_millis() as u64,
                best = shared.top.best().map(|s| s.value),
            );
        }
    }

    /// Retained best scores of the most recent run, ordered best-first.
    pub fn top_scores(&self) -> Vec<RuleSeekScore> {
        self.shared
            .as_ref()
            .map(|s| s.top.snapshot())
            .unwrap_or_default()
    }

    /// Best score of the most recent run.
    pub fn best(&self) -> Option<RuleSeekScore> {
        self.shared.as_ref().and_then(|s| s.top.best())
    }

    /// Diagnostics of the most recent run.
    pub fn diagnostics(&self) -> SeekDiagnostics {
        self.shared
            .as_ref()
            .map(|s| s.diagnostics.snapshot())
            .unwrap_or_default()
    }
}

impl Drop for RuleSeekSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for RuleSeekSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSeekSession")
            .field("kpi", &self.kpi.name())
            .field("running", &self.is_running())
            .finish()
    }
}

struct WorkerSlot {
    id: u64,
    stop: CancelToken,
    throttle_ms: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

/// The admission thread's state: sizes the pool once per tick, reaps
/// workers that exited on their own, and drives the delivery flush timer.
struct AdmissionLoop {
    shared: Arc<RunShared>,
    config: SeekConfig,
    budget: Arc<dyn CpuBudget>,
    snapshot: Arc<dyn SnapshotService>,
    kpi: Arc<dyn KpiCalculator>,
    session_seed: u64,
    next_worker: u64,
    workers: Vec<WorkerSlot>,
    draining: Vec<JoinHandle<()>>,
    last_flush: Instant,
}

impl AdmissionLoop {
    fn run(mut self) {
        while !self.shared.token.is_cancelled() {
            self.reap();
            self.adjust();
            self.flush_if_due();
            thread::sleep(self.config.admission_tick());
        }
        self.drain();
        self.shared.diagnostics.mark_finished();
        debug!(event = "admission_stopped");
    }

    /// Joins workers that exited on their own (fault or iteration limit)
    /// and evicted workers that have finished winding down.
    fn reap(&mut self) {
        let mut index = 0;
        while index < self.workers.len() {
            if self.workers[index].handle.is_finished() {
                let slot = self.workers.remove(index);
                let _ = slot.handle.join();
            } else {
                index += 1;
            }
        }
        let mut index = 0;
        while index < self.draining.len() {
            if self.draining[index].is_finished() {
                let _ = self.draining.remove(index).join();
            } else {
                index += 1;
            }
        }
    }

    /// One admission step: at most one start or stop per tick.
    fn adjust(&mut self) {
        let target = self.budget.target_workers();
        match admission_action(self.workers.len(), target, self.config.max_workers) {
            AdmissionAction::Start => self.start_worker(),
            AdmissionAction::Stop => self.stop_newest(),
            AdmissionAction::Hold { throttle } => self.throttle_newest(throttle),
        }
    }

    fn start_worker(&mut self) {
        let id = self.next_worker;
        self.next_worker += 1;
        let stop = CancelToken::new();
        let throttle_ms = Arc::new(AtomicU64::new(0));
        let iterations = self.shared.diagnostics.register_worker(id);
        let ctx = WorkerContext {
            id,
            seed: self.session_seed.wrapping_add(id),
            snapshot: Arc::clone(&self.snapshot),
            kpi: Arc::clone(&self.kpi),
            mode: self.config.perturb_mode,
            max_point_step: self.config.max_point_step,
            iteration_limit: self.config.iteration_limit,
            shared: Arc::clone(&self.shared),
            stop: stop.clone(),
            throttle_ms: Arc::clone(&throttle_ms),
            iterations,
        };
        let handle = thread::spawn(move || run_worker(ctx));
        debug!(event = "worker_admitted", worker = id, active = self.workers.len() + 1);
        self.workers.push(WorkerSlot {
            id,
            stop,
            throttle_ms,
            handle,
        });
    }

    fn stop_newest(&mut self) {
        if let Some(slot) = self.workers.pop() {
            slot.stop.cancel();
            debug!(event = "worker_evicted", worker = slot.id, active = self.workers.len());
            self.draining.push(slot.handle);
        }
    }

    /// Serves the fractional part of the budget by delaying the most
    /// recently started worker for that fraction of the tick.
    fn throttle_newest(&mut self, throttle: f64) {
        if throttle <= 0.0 {
            return;
        }
        let Some(slot) = self.workers.last() else {
            return;
        };
        let delay = throttle_delay(self.config.admission_tick(), throttle);
        let delay_ms = delay.as_millis() as u64;
        slot.throttle_ms.store(delay_ms, Ordering::Relaxed);
        debug!(event = "worker_throttled", worker = slot.id, delay_ms);
    }

    fn flush_if_due(&mut self) {
        if self.last_flush.elapsed() < self.config.delivery_interval() {
            return;
        }
        self.shared.delivery.flush(&self.shared.top);
        self.last_flush = Instant::now();
    }

    /// Stops and joins every remaining worker before the thread exits.
    fn drain(&mut self) {
        for slot in &self.workers {
            slot.stop.cancel();
        }
        for slot in self.workers.drain(..) {
            let _ = slot.handle.join();
        }
        for handle in self.draining.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
