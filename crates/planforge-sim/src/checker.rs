//! Schedule consistency checker
//!
//! Walks a finished schedule and reports structural violations instead of
//! asserting on them; callers decide whether a dirty schedule is fatal.
//! Operations whose predecessor expanded into several activities are
//! reported through a skip counter rather than checked, because a partial
//! overlap between a successor and one member of a split predecessor can be
//! legitimate when quantities flow between them.

use std::fmt::Write as _;

use tracing::warn;

use planforge_core::{Capacity, Scenario, ScheduleState};

/// What a consistency walk can object to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Block whose window is empty or backwards.
    EmptyBlock,
    /// Block lying entirely before the scenario clock. Anchored in-progress
    /// work may straddle the clock, so only the end is checked.
    BlockBeforeClock,
    /// Activity scheduled before its release, material, or frozen floor.
    BlockBeforeAvailability,
    /// More simultaneous blocks on a resource than its capacity allows.
    OverlappingBlocks,
    /// Successor activity starting before its predecessor finished.
    PredecessorOverlap,
    /// Activity claimed as a member by more than one batch.
    DuplicateBatchMembership,
    /// Activity whose reservation disagrees with its batch, or whose batch
    /// does not list it as a member.
    ReservationMismatch,
}

/// One finding from a consistency walk.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of one consistency walk.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub violations: Vec<Violation>,
    /// Predecessor checks skipped because the predecessor operation holds
    /// more than one live activity.
    pub multi_predecessor_skips: usize,
    pub blocks_walked: usize,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Findings of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }
}

/// Walks every block, batch, and precedence edge of the schedule.
pub fn check_schedule(scenario: &Scenario, schedule: &ScheduleState) -> CheckReport {
    let mut report = CheckReport::default();
    check_blocks(scenario, schedule, &mut report);
    check_availability(scenario, schedule, &mut report);
    check_batches(schedule, &mut report);
    check_precedence(scenario, schedule, &mut report);
    for violation in &report.violations {
        warn!(event = "consistency_violation", kind = ?violation.kind, %violation);
    }
    report
}

fn check_blocks(scenario: &Scenario, schedule: &ScheduleState, report: &mut CheckReport) {
    for block in schedule.blocks() {
        report.blocks_walked += 1;
        let resource = &scenario.resources[block.resource_index];
        if block.start >= block.end {
            report.violations.push(Violation::new(
                ViolationKind::EmptyBlock,
                format!(
                    "empty block [{}, {}) on {}",
                    block.start, block.end, resource.id
                ),
            ));
        }
        if block.end < scenario.clock {
            report.violations.push(Violation::new(
                ViolationKind::BlockBeforeClock,
                format!(
                    "block on {} ends at {} before clock {}",
                    resource.id, block.end, scenario.clock
                ),
            ));
        }
        let slots = match resource.capacity {
            Capacity::Single => 1,
            Capacity::Parallel(n) => n.max(1) as usize,
        };
        let simultaneous = schedule
            .blocks_on(block.resource_index)
            .filter(|other| block.overlaps(other))
            .count();
        if simultaneous > slots {
            report.violations.push(Violation::new(
                ViolationKind::OverlappingBlocks,
                format!(
                    "{} simultaneous blocks on {} (capacity {})",
                    simultaneous, resource.id, slots
                ),
            ));
        }
    }
}

fn check_availability(scenario: &Scenario, schedule: &ScheduleState, report: &mut CheckReport) {
    let floor = scenario.dispatch_floor();
    for activity in schedule.activities() {
        let Some(start) = activity.scheduled_start else {
            continue;
        };
        let op = scenario.operation(activity.job_index, activity.op_index);
        let available = op.earliest_available(scenario.clock);
        if start < available {
            report.violations.push(Violation::new(
                ViolationKind::BlockBeforeAvailability,
                format!(
                    "activity {} of {} starts at {start} before availability {available}",
                    activity.id.0, op.id
                ),
            ));
        }
        if !activity.anchored && start < floor {
            report.violations.push(Violation::new(
                ViolationKind::BlockBeforeAvailability,
                format!(
                    "activity {} of {} starts at {start} inside the frozen window ending {floor}",
                    activity.id.0, op.id
                ),
            ));
        }
    }
}

fn check_batches(schedule: &ScheduleState, report: &mut CheckReport) {
    let mut membership = vec![0usize; schedule.activities().len()];
    for batch in schedule.batches() {
        for member in &batch.members {
            membership[member.0 as usize] += 1;
            let activity = schedule.activity(*member);
            if activity.batch != Some(batch.id) || activity.reservation != Some(batch.resource_index)
            {
                report.violations.push(Violation::new(
                    ViolationKind::ReservationMismatch,
                    format!(
                        "activity {} disagrees with batch {} about its placement",
                        member.0, batch.id.0
                    ),
                ));
            }
        }
    }
    for (index, &count) in membership.iter().enumerate() {
        if count > 1 {
            report.violations.push(Violation::new(
                ViolationKind::DuplicateBatchMembership,
                format!("activity {index} is claimed by {count} batches"),
            ));
        }
    }
    for activity in schedule.activities() {
        if activity.is_scheduled() {
            let listed = activity
                .batch
                .map(|b| schedule.batch(b).members.contains(&activity.id))
                .unwrap_or(false);
            if !listed {
                report.violations.push(Violation::new(
                    ViolationKind::ReservationMismatch,
                    format!("scheduled activity {} is not listed by its batch", activity.id.0),
                ));
            }
        }
    }
}

fn check_precedence(scenario: &Scenario, schedule: &ScheduleState, report: &mut CheckReport) {
    for (job_index, job) in scenario.jobs.iter().enumerate() {
        for (op_index, op) in job.operations.iter().enumerate() {
            for pred_id in &op.predecessors {
                let Some((pred_job, pred_op)) = scenario.find_operation(pred_id) else {
                    continue;
                };
                let pred_activities: Vec<_> = schedule
                    .activities()
                    .iter()
                    .filter(|a| a.job_index == pred_job && a.op_index == pred_op && !a.absorbed)
                    .collect();
                if pred_activities.len() > 1 {
                    report.multi_predecessor_skips += 1;
                    warn!(
                        event = "predecessor_check_skipped",
                        operation = %op.id,
                        predecessor = %pred_id,
                        activities = pred_activities.len(),
                    );
                    continue;
                }
                let Some(pred_end) = pred_activities.first().and_then(|a| a.scheduled_end) else {
                    continue;
                };
                for activity in schedule
                    .activities()
                    .iter()
                    .filter(|a| a.job_index == job_index && a.op_index == op_index)
                {
                    if let Some(start) = activity.scheduled_start {
                        if start < pred_end {
                            report.violations.push(Violation::new(
                                ViolationKind::PredecessorOverlap,
                                format!(
                                    "activity {} of {} starts at {start} before predecessor {} ends at {pred_end}",
                                    activity.id.0, op.id, pred_id
                                ),
                            ));
                        }
                    }
                }
            }
        }
    }
}

/// Renders the committed blocks as an indented per-resource listing, for
/// logs and engineering review.
pub fn render_block_report(scenario: &Scenario, schedule: &ScheduleState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "schedule for {}", scenario.name);
    for (resource_index, resource) in scenario.resources.iter().enumerate() {
        let mut blocks: Vec<_> = schedule.blocks_on(resource_index).collect();
        blocks.sort_by_key(|b| (b.start, b.end));
        let _ = writeln!(out, "resource {} ({} blocks)", resource.id, blocks.len());
        for block in blocks {
            let batch = schedule.batch(block.batch);
            let _ = writeln!(
                out,
                "  [{} .. {}) batch {} members {} quantity {}",
                block.start,
                block.end,
                batch.id.0,
                batch.members.len(),
                batch.quantity,
            );
        }
    }
    out
}
