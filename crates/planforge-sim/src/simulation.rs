//! Discrete-event scheduling simulation
//!
//! One [`Simulation`] run expands a [`Scenario`] into activities, dispatches
//! them in candidate order, and commits resource blocks until nothing
//! schedulable remains. All ordering flows through the [`CandidateQueue`],
//! so two runs over identical inputs produce identical schedules.
//!
//! A run never panics on bad input. Scenarios that fail structural
//! validation terminate before any activity is created; faults raised
//! mid-run (a resource naming a rule-weight set the scenario no longer
//! carries, for instance) end the run with [`SimulationStatus::Exception`]
//! and keep the partial schedule for diagnosis.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, info, warn};

use planforge_core::time::SimTime;
use planforge_core::{
    Activity, ActivityId, BatchId, Operation, Resource, ResourceBlock, Scenario, ScheduleState,
};
use planforge_scoring::{CompositeScorer, ScoreContext};

use crate::error::SimError;
use crate::progress::{NullSink, ProgressEvent, ProgressSampler, ProgressSink, SimulationStatus};
use crate::queue::{CandidateKey, CandidateQueue};
use crate::validate::validate_scenario;

/// Scores within this distance count as tied and fall through to the
/// earlier-start, lower-resource-index tie-break.
const SCORE_EPS: f64 = 1e-9;
/// Slack for quantity comparisons against batch capacities.
const QTY_EPS: f64 = 1e-9;

/// Summary counters for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub status: SimulationStatus,
    pub simulation_number: u64,
    /// Activities committed to a resource block or batch.
    pub scheduled: usize,
    /// Activities no eligible resource could start within the horizon.
    pub failed: usize,
    pub blocks_committed: usize,
}

/// Everything one run produced. The schedule is present for every terminal
/// status; an `Exception` run keeps what was committed before the fault.
#[derive(Debug)]
pub struct SimulationOutcome {
    pub schedule: ScheduleState,
    pub report: SimulationReport,
    /// The validation failure behind `Terminated` or the fault behind
    /// `Exception`. `None` on success.
    pub error: Option<SimError>,
}

impl SimulationOutcome {
    /// Whether the run finished its scheduling pass and post-run work.
    pub fn is_complete(&self) -> bool {
        self.report.status == SimulationStatus::PostSimulationWorkComplete
    }
}

/// The simulation driver. Cheap to construct; one instance runs one
/// scenario at a time and may be reused across scenarios.
pub struct Simulation {
    scorer: CompositeScorer,
    sink: Arc<dyn ProgressSink>,
    simulation_number: u64,
    progress_step: u8,
}

impl Simulation {
    pub fn new(scorer: CompositeScorer) -> Self {
        Self {
            scorer,
            sink: Arc::new(NullSink),
            simulation_number: 0,
            progress_step: 10,
        }
    }

    /// Driver over the standard rule-element library.
    pub fn standard() -> Self {
        Self::new(CompositeScorer::standard())
    }

    /// Sets the sink progress events are published to.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Tags every event and report from this driver with a run number.
    pub fn with_simulation_number(mut self, number: u64) -> Self {
        self.simulation_number = number;
        self
    }

    /// Sets the minimum percent gap between `Scheduling` progress events.
    pub fn with_progress_step(mut self, step_percent: u8) -> Self {
        self.progress_step = step_percent;
        self
    }

    /// Runs the scenario to a terminal status.
    pub fn run(&self, scenario: &Scenario) -> SimulationOutcome {
        let mut schedule = ScheduleState::new();
        self.publish(SimulationStatus::Initializing, 0);
        info!(
            event = "sim_start",
            scenario = %scenario.name,
            simulation_number = self.simulation_number,
            jobs = scenario.jobs.len(),
            resources = scenario.resources.len(),
        );

        if let Err(errors) = validate_scenario(scenario) {
            warn!(event = "sim_terminated", errors = errors.len());
            self.publish(SimulationStatus::Terminated, 0);
            return SimulationOutcome {
                schedule,
                report: self.report(SimulationStatus::Terminated, 0, 0, 0),
                error: Some(SimError::Validation(errors)),
            };
        }

        self.publish(SimulationStatus::Started, 0);
        let mut run = RunState::expand(scenario, &mut schedule, self.progress_step);
        let result = self.schedule_loop(scenario, &mut schedule, &mut run);

        let scheduled = schedule.scheduled_count();
        let blocks = schedule.blocks().len();
        let percent = percent_of(&schedule);
        match result {
            Ok(()) => {
                self.publish(SimulationStatus::Complete, percent);
                info!(
                    event = "sim_complete",
                    simulation_number = self.simulation_number,
                    scheduled,
                    failed = run.failed,
                    blocks,
                    makespan_end = schedule.makespan_end().unwrap_or(scenario.clock),
                );
                self.publish(SimulationStatus::PostSimulationWorkComplete, percent);
                SimulationOutcome {
                    schedule,
                    report: self.report(
                        SimulationStatus::PostSimulationWorkComplete,
                        scheduled,
                        run.failed,
                        blocks,
                    ),
                    error: None,
                }
            }
            Err(fault) => {
                warn!(event = "sim_fault", error = %fault);
                self.publish(SimulationStatus::Exception, percent);
                SimulationOutcome {
                    schedule,
                    report: self.report(SimulationStatus::Exception, scheduled, run.failed, blocks),
                    error: Some(fault),
                }
            }
        }
    }

    fn report(
        &self,
        status: SimulationStatus,
        scheduled: usize,
        failed: usize,
        blocks_committed: usize,
    ) -> SimulationReport {
        SimulationReport {
            status,
            simulation_number: self.simulation_number,
            scheduled,
            failed,
            blocks_committed,
        }
    }

    fn publish(&self, status: SimulationStatus, percent: u8) {
        self.sink.publish(ProgressEvent {
            status,
            percent,
            simulation_number: self.simulation_number,
        });
    }

    fn schedule_loop(
        &self,
        scenario: &Scenario,
        schedule: &mut ScheduleState,
        run: &mut RunState,
    ) -> Result<(), SimError> {
        while let Some(key) = run.queue.pop() {
            // Stale entries: the activity was absorbed into a batch or was
            // already committed since it was enqueued.
            if !schedule.activity(key.activity).is_pending() {
                continue;
            }
            self.dispatch(scenario, schedule, run, key.activity, key.time)?;
            if let Some(percent) = run
                .sampler
                .sample(schedule.scheduled_count(), schedule.schedulable_count())
            {
                self.publish(SimulationStatus::Scheduling, percent);
            }
        }
        Ok(())
    }

    /// Scores the activity on each eligible resource and commits the winner.
    fn dispatch(
        &self,
        scenario: &Scenario,
        schedule: &mut ScheduleState,
        run: &mut RunState,
        activity_id: ActivityId,
        ready_time: SimTime,
    ) -> Result<(), SimError> {
        let (job_index, op_index, quantity) = {
            let a = schedule.activity(activity_id);
            (a.job_index, a.op_index, a.required_finish_quantity)
        };
        let slot = run.slot_lookup[job_index][op_index];
        let op = scenario.operation(job_index, op_index);
        let span = op.total_span();
        let horizon = scenario.horizon_end();

        let mut best: Option<Placement> = None;
        for &resource_index in run.ops[slot].resources.iter() {
            let resource = &scenario.resources[resource_index];
            let weights = scenario.weight_set(&resource.weight_set).ok_or_else(|| {
                SimError::Fault(format!(
                    "resource {} names rule-weight set {} which the scenario does not carry",
                    resource.id, resource.weight_set
                ))
            })?;

            let placement = match joinable_batch(schedule, op, resource, resource_index, ready_time, quantity)
            {
                Some(batch_id) => {
                    let batch = schedule.batch(batch_id);
                    Placement {
                        resource_index,
                        capacity_slot: 0,
                        start: batch.start,
                        end: batch.end,
                        join: Some(batch_id),
                        score: 0.0,
                    }
                }
                None => {
                    let (capacity_slot, free) = run.earliest_slot(resource_index);
                    let start = ready_time.max(free);
                    Placement {
                        resource_index,
                        capacity_slot,
                        start,
                        end: start + span,
                        join: None,
                        score: 0.0,
                    }
                }
            };
            if placement.start > horizon {
                continue;
            }

            let ctx = ScoreContext {
                scenario,
                schedule,
                activity: schedule.activity(activity_id),
                resource_index,
                clock: scenario.clock,
                earliest_start: placement.start,
                resource_multiplier: resource.dispatch_multiplier,
            };
            let score = self.scorer.score(weights, &ctx);
            let placement = Placement { score, ..placement };
            if best.as_ref().map_or(true, |b| placement.beats(b)) {
                best = Some(placement);
            }
        }

        match best {
            Some(placement) => self.commit(
                scenario, schedule, run, activity_id, slot, ready_time, placement,
            ),
            None => {
                run.failed += 1;
                debug!(
                    event = "activity_unplaceable",
                    activity = activity_id.0,
                    operation = %op.id,
                );
                Ok(())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn commit(
        &self,
        scenario: &Scenario,
        schedule: &mut ScheduleState,
        run: &mut RunState,
        activity_id: ActivityId,
        slot: usize,
        ready_time: SimTime,
        placement: Placement,
    ) -> Result<(), SimError> {
        let (job_index, op_index) = {
            let a = schedule.activity(activity_id);
            (a.job_index, a.op_index)
        };
        let op = scenario.operation(job_index, op_index);
        let resource = &scenario.resources[placement.resource_index];
        let batch_capacity = match op.batch_family {
            Some(_) => resource.batch_capacity.filter(|c| *c > 0.0),
            None => None,
        };

        let batch_id = match placement.join {
            Some(batch_id) => {
                let quantity = schedule.activity(activity_id).required_finish_quantity;
                {
                    let batch = schedule.batch_mut(batch_id);
                    batch.members.push(activity_id);
                    batch.quantity += quantity;
                }
                debug!(
                    event = "batch_join",
                    activity = activity_id.0,
                    batch = batch_id.0,
                    resource = %resource.id,
                );
                batch_id
            }
            None => {
                // A quantity over the per-batch capacity splits here: this
                // activity shrinks to what one batch carries and the
                // remainder re-enters the queue as a fresh activity.
                if let Some(capacity) = batch_capacity {
                    let quantity = schedule.activity(activity_id).required_finish_quantity;
                    if quantity > capacity + QTY_EPS {
                        let remainder = quantity - capacity;
                        {
                            let a = schedule.activity_mut(activity_id);
                            a.required_start_quantity = capacity;
                            a.required_finish_quantity = capacity;
                        }
                        let rest = schedule.push_activity(job_index, op_index, remainder);
                        run.queue.push(CandidateKey {
                            time: ready_time,
                            activity: rest,
                        });
                        debug!(
                            event = "activity_split",
                            activity = activity_id.0,
                            remainder_activity = rest.0,
                            remainder,
                        );
                    }
                }
                let quantity = schedule.activity(activity_id).required_finish_quantity;
                let family = op.batch_family.clone().unwrap_or_default();
                let batch_id = schedule.push_batch(
                    family,
                    placement.resource_index,
                    placement.start,
                    placement.end,
                );
                {
                    let batch = schedule.batch_mut(batch_id);
                    batch.members.push(activity_id);
                    batch.quantity = quantity;
                }
                schedule.commit_block(ResourceBlock {
                    resource_index: placement.resource_index,
                    batch: batch_id,
                    start: placement.start,
                    end: placement.end,
                });
                run.slot_free[placement.resource_index][placement.capacity_slot] = placement.end;
                debug!(
                    event = "block_committed",
                    activity = activity_id.0,
                    resource = %resource.id,
                    start = placement.start,
                    end = placement.end,
                );
                batch_id
            }
        };

        {
            let activity = schedule.activity_mut(activity_id);
            activity.scheduled_start = Some(placement.start);
            activity.scheduled_end = Some(placement.end);
            activity.reservation = Some(placement.resource_index);
            activity.batch = Some(batch_id);
        }

        if let Some(capacity) = batch_capacity {
            absorb_siblings(schedule, activity_id, batch_id, capacity);
        }
        run.settle_operation(scenario, schedule, slot);
        Ok(())
    }
}

/// One scored (resource, window) candidate for an activity.
#[derive(Debug, Clone, Copy)]
struct Placement {
    resource_index: usize,
    /// Capacity slot the block lands on; meaningless for joins.
    capacity_slot: usize,
    start: SimTime,
    end: SimTime,
    join: Option<BatchId>,
    score: f64,
}

impl Placement {
    /// Strictly-better comparison: higher score wins, near-ties fall to the
    /// earlier start, then the lower resource index.
    fn beats(&self, other: &Placement) -> bool {
        if self.score > other.score + SCORE_EPS {
            return true;
        }
        if other.score > self.score + SCORE_EPS {
            return false;
        }
        (self.start, self.resource_index) < (other.start, other.resource_index)
    }
}

/// Open batch the activity may join: same resource, same family, a window
/// the activity's availability and span both match, and quantity headroom.
/// Among several, the fullest batch wins.
fn joinable_batch(
    schedule: &ScheduleState,
    op: &Operation,
    resource: &Resource,
    resource_index: usize,
    ready_time: SimTime,
    quantity: f64,
) -> Option<BatchId> {
    let family = op.batch_family.as_deref()?;
    let capacity = resource.batch_capacity.filter(|c| *c > 0.0)?;
    let span = op.total_span();
    schedule
        .batches()
        .iter()
        .filter(|b| b.resource_index == resource_index && b.family == family)
        .filter(|b| b.start >= ready_time && b.end - b.start == span)
        .filter(|b| b.remaining_capacity(capacity) + QTY_EPS >= quantity)
        .fold(None, |best: Option<(BatchId, f64)>, b| match best {
            Some((_, q)) if q >= b.quantity => best,
            _ => Some((b.id, b.quantity)),
        })
        .map(|(id, _)| id)
}

/// Folds pending same-operation siblings into the batch the host activity
/// just committed to, while headroom lasts. Absorbed activities drop out of
/// the schedulable set and their quantity moves onto the host.
fn absorb_siblings(
    schedule: &mut ScheduleState,
    host: ActivityId,
    batch_id: BatchId,
    capacity: f64,
) {
    let (job_index, op_index) = {
        let a = schedule.activity(host);
        (a.job_index, a.op_index)
    };
    loop {
        let remaining = capacity - schedule.batch(batch_id).quantity;
        if remaining <= QTY_EPS {
            return;
        }
        let sibling = schedule
            .activities()
            .iter()
            .filter(|a| a.job_index == job_index && a.op_index == op_index)
            .filter(|a| a.id != host && a.is_pending())
            .find(|a| a.required_finish_quantity <= remaining + QTY_EPS)
            .map(|a| (a.id, a.required_finish_quantity));
        let Some((sibling_id, quantity)) = sibling else {
            return;
        };
        {
            let absorbed = schedule.activity_mut(sibling_id);
            absorbed.absorbed = true;
            absorbed.required_start_quantity = 0.0;
            absorbed.required_finish_quantity = 0.0;
        }
        {
            let host_activity = schedule.activity_mut(host);
            host_activity.required_start_quantity += quantity;
            host_activity.required_finish_quantity += quantity;
        }
        schedule.batch_mut(batch_id).quantity += quantity;
        debug!(
            event = "activity_absorbed",
            absorbed = sibling_id.0,
            into = host.0,
            quantity,
        );
    }
}

fn percent_of(schedule: &ScheduleState) -> u8 {
    let total = schedule.schedulable_count();
    if total == 0 {
        return 100;
    }
    (schedule.scheduled_count() * 100 / total).min(100) as u8
}

/// One operation's bookkeeping during a run.
struct OpSlot {
    job_index: usize,
    op_index: usize,
    remaining_preds: usize,
    /// Latest finish over completed predecessors.
    pred_finish: SimTime,
    /// Slots whose predecessor count drops when this operation completes.
    successors: Vec<usize>,
    /// Eligible resources resolved to indices, in declaration order.
    resources: SmallVec<[usize; 4]>,
    done: bool,
}

/// Per-run mutable state outside the schedule itself.
struct RunState {
    ops: Vec<OpSlot>,
    /// `slot_lookup[job][op]` is the flat slot index.
    slot_lookup: Vec<Vec<usize>>,
    /// Next free time per capacity slot per resource.
    slot_free: Vec<Vec<SimTime>>,
    queue: CandidateQueue,
    failed: usize,
    sampler: ProgressSampler,
}

impl RunState {
    /// Expands operations into activities, resolves the precedence graph,
    /// and seeds the candidate queue with predecessor-free work.
    fn expand(scenario: &Scenario, schedule: &mut ScheduleState, progress_step: u8) -> Self {
        let mut ops = Vec::new();
        let mut slot_lookup = Vec::new();
        for (job_index, job) in scenario.jobs.iter().enumerate() {
            let mut row = Vec::new();
            for (op_index, op) in job.operations.iter().enumerate() {
                row.push(ops.len());
                let resources = op
                    .eligible_resources
                    .iter()
                    .filter_map(|id| scenario.resource_index(id))
                    .collect();
                ops.push(OpSlot {
                    job_index,
                    op_index,
                    remaining_preds: op.predecessors.len(),
                    pred_finish: scenario.clock,
                    successors: Vec::new(),
                    resources,
                    done: false,
                });
            }
            slot_lookup.push(row);
        }

        // Validation has already resolved every predecessor id.
        for slot in 0..ops.len() {
            let (job_index, op_index) = (ops[slot].job_index, ops[slot].op_index);
            for pred_id in &scenario.operation(job_index, op_index).predecessors {
                if let Some((pj, po)) = scenario.find_operation(pred_id) {
                    let pred_slot = slot_lookup[pj][po];
                    ops[pred_slot].successors.push(slot);
                }
            }
        }

        let slot_free = scenario
            .resources
            .iter()
            .map(|r| vec![scenario.clock; r.capacity.slots() as usize])
            .collect();

        let mut state = Self {
            ops,
            slot_lookup,
            slot_free,
            queue: CandidateQueue::new(),
            failed: 0,
            sampler: ProgressSampler::new(progress_step),
        };

        // Quantities over the per-activity cap expand into several
        // activities up front.
        for slot in 0..state.ops.len() {
            let (job_index, op_index) = (state.ops[slot].job_index, state.ops[slot].op_index);
            let op = scenario.operation(job_index, op_index);
            let cap = op
                .max_quantity_per_activity
                .filter(|m| *m > 0.0)
                .unwrap_or(f64::INFINITY);
            let mut remaining = op.required_quantity;
            while remaining > QTY_EPS {
                let quantity = remaining.min(cap);
                schedule.push_activity(job_index, op_index, quantity);
                remaining -= quantity;
            }
        }

        for slot in 0..state.ops.len() {
            if state.ops[slot].remaining_preds == 0 {
                state.enqueue_operation(scenario, schedule, slot);
            }
        }
        state
    }

    /// Ready time for the slot's activities: operation availability, the
    /// latest predecessor finish, and the frozen-window floor.
    fn ready_time(&self, scenario: &Scenario, slot: usize) -> SimTime {
        let op = scenario.operation(self.ops[slot].job_index, self.ops[slot].op_index);
        op.earliest_available(scenario.clock)
            .max(self.ops[slot].pred_finish)
            .max(scenario.dispatch_floor())
    }

    fn enqueue_operation(&mut self, scenario: &Scenario, schedule: &ScheduleState, slot: usize) {
        let time = self.ready_time(scenario, slot);
        let (job_index, op_index) = (self.ops[slot].job_index, self.ops[slot].op_index);
        for activity in schedule.activities() {
            if activity.job_index == job_index
                && activity.op_index == op_index
                && activity.is_pending()
            {
                self.queue.push(CandidateKey {
                    time,
                    activity: activity.id,
                });
            }
        }
    }

    /// Lowest-indexed capacity slot with the earliest free time.
    fn earliest_slot(&self, resource_index: usize) -> (usize, SimTime) {
        let slots = &self.slot_free[resource_index];
        let mut best = (0, slots[0]);
        for (index, &free) in slots.iter().enumerate().skip(1) {
            if free < best.1 {
                best = (index, free);
            }
        }
        best
    }

    /// Marks the operation done once no activity of it is pending, then
    /// unlocks successors whose predecessor count reaches zero.
    fn settle_operation(&mut self, scenario: &Scenario, schedule: &ScheduleState, slot: usize) {
        if self.ops[slot].done {
            return;
        }
        let (job_index, op_index) = (self.ops[slot].job_index, self.ops[slot].op_index);
        let of_op = |a: &&Activity| a.job_index == job_index && a.op_index == op_index;
        if schedule.activities().iter().filter(of_op).any(|a| a.is_pending()) {
            return;
        }
        self.ops[slot].done = true;
        let finish = schedule
            .activities()
            .iter()
            .filter(of_op)
            .filter_map(|a| a.scheduled_end)
            .max()
            .unwrap_or(scenario.clock);

        let successors = self.ops[slot].successors.clone();
        for succ in successors {
            self.ops[succ].remaining_preds = self.ops[succ].remaining_preds.saturating_sub(1);
            self.ops[succ].pred_finish = self.ops[succ].pred_finish.max(finish);
            if self.ops[succ].remaining_preds == 0 {
                self.enqueue_operation(scenario, schedule, succ);
            }
        }
    }
}

#[cfg(test)]
#[path = "simulation_tests.rs"]
mod simulation_tests;
