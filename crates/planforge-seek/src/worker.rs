//! RuleSeek worker loop
//!
//! A worker owns nothing but its RNG and its personal best: every iteration
//! takes a fresh baseline snapshot, perturbs the snapshot's weight sets,
//! runs a full scheduling pass, and scores the result. Only strict
//! improvements over the worker's own best are forwarded to the shared
//! Top-K set. The first pass runs the baseline weights untouched so the
//! search starts from the incumbent plan.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, warn};

use planforge_config::PerturbMode;
use planforge_core::{DomainError, KpiCalculator, KpiDirection, SnapshotService};
use planforge_sim::{Simulation, SimulationStatus};

use crate::delivery::Discovery;
use crate::perturb::perturb_weight_sets;
use crate::score::{Acceptance, RuleSeekScore};
use crate::session::RunShared;

/// Everything one worker needs, handed over at spawn.
pub(crate) struct WorkerContext {
    pub id: u64,
    pub seed: u64,
    pub snapshot: Arc<dyn SnapshotService>,
    pub kpi: Arc<dyn KpiCalculator>,
    pub mode: PerturbMode,
    pub max_point_step: i32,
    pub iteration_limit: Option<u64>,
    pub shared: Arc<RunShared>,
    /// Stops this worker alone; the shared token stops the whole run.
    pub stop: planforge_core::CancelToken,
    /// Delay in milliseconds injected by admission control, taken once.
    pub throttle_ms: Arc<AtomicU64>,
    /// Completed-iteration counter registered with the diagnostics.
    pub iterations: Arc<AtomicU64>,
}

#[derive(Debug, Error)]
enum WorkerFault {
    #[error(transparent)]
    Collaborator(#[from] DomainError),
    #[error("simulation ended in {0:?}")]
    Simulation(SimulationStatus),
}

/// Body of one worker thread. Returns once cancelled, stopped, faulted,
/// or past the per-worker iteration limit; always retires its counter.
pub(crate) fn run_worker(ctx: WorkerContext) {
    let simulation = Simulation::standard().with_simulation_number(ctx.id);
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.seed);
    let direction = ctx.kpi.direction();
    let mut own_best = direction.worst_value();
    let mut first_iteration = true;
    debug!(event = "worker_started", worker = ctx.id);

    loop {
        if ctx.shared.token.is_cancelled() || ctx.stop.is_cancelled() {
            break;
        }
        let delay = ctx.throttle_ms.swap(0, Ordering::Relaxed);
        if delay > 0 {
            thread::sleep(Duration::from_millis(delay));
            continue;
        }
        match iterate(
            &ctx,
            &simulation,
            &mut rng,
            first_iteration,
            &mut own_best,
            direction,
        ) {
            Ok(()) => {
                first_iteration = false;
                let done = ctx.iterations.fetch_add(1, Ordering::Relaxed) + 1;
                if ctx.iteration_limit.is_some_and(|limit| done >= limit) {
                    debug!(event = "worker_limit_reached", worker = ctx.id, iterations = done);
                    break;
                }
            }
            Err(fault) => {
                warn!(event = "worker_fault", worker = ctx.id, error = %fault);
                break;
            }
        }
    }

    ctx.shared.diagnostics.retire_worker(ctx.id);
    debug!(event = "worker_stopped", worker = ctx.id);
}

/// One snapshot, perturb, simulate, score pass. The snapshot is dropped on
/// return no matter how the pass ends.
fn iterate(
    ctx: &WorkerContext,
    simulation: &Simulation,
    rng: &mut ChaCha8Rng,
    first_iteration: bool,
    own_best: &mut f64,
    direction: KpiDirection,
) -> Result<(), WorkerFault> {
    let mut snapshot = ctx.snapshot.snapshot()?;
    if !first_iteration {
        perturb_weight_sets(&mut snapshot.weight_sets, ctx.mode, ctx.max_point_step, rng);
    }

    let outcome = simulation.run(&snapshot);
    if !outcome.is_complete() {
        return Err(WorkerFault::Simulation(outcome.report.status));
    }
    let value = ctx.kpi.compute(&snapshot, &outcome.schedule)?;
    if !direction.improves(value, *own_best) {
        return Ok(());
    }
    *own_best = value;

    // A result finished after stop is discarded, not delivered.
    if ctx.shared.token.is_cancelled() || ctx.stop.is_cancelled() {
        return Ok(());
    }

    let acceptance = ctx.shared.top.submit(RuleSeekScore {
        value,
        direction,
        weight_sets: snapshot.weight_sets.clone(),
    });
    if acceptance == Acceptance::Best {
        ctx.shared.diagnostics.record_best();
    }
    if acceptance.is_accepted() {
        debug!(event = "improvement_found", worker = ctx.id, value);
        ctx.shared.delivery.offer(Discovery {
            weight_sets: snapshot.weight_sets,
            kpi_value: value,
            kpi_text: ctx.kpi.format(value),
        });
    }
    Ok(())
}
