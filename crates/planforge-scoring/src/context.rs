//! Read-only scoring context
//!
//! One [`ScoreContext`] describes a single (activity, resource) candidate at
//! a point in simulation time. The simulation core builds one per candidate
//! and resource; rule elements read it and never mutate anything.

use planforge_core::{Activity, Operation, Resource, Scenario, ScheduleState, SimTime};

/// Everything a rule element may look at when scoring one candidate.
#[derive(Clone, Copy)]
pub struct ScoreContext<'a> {
    pub scenario: &'a Scenario,
    pub schedule: &'a ScheduleState,
    pub activity: &'a Activity,
    /// Resource the candidate is being evaluated against.
    pub resource_index: usize,
    /// Current simulation clock.
    pub clock: SimTime,
    /// Earliest feasible start for this (activity, resource) pairing, after
    /// release, material, frozen-window, and resource-availability floors.
    pub earliest_start: SimTime,
    /// Externally supplied multiplier for alternate-resource comparisons,
    /// set once per scoring pass over a candidate's eligible resources.
    pub resource_multiplier: f64,
}

impl<'a> ScoreContext<'a> {
    /// The operation owning the candidate activity.
    pub fn operation(&self) -> &'a Operation {
        self.scenario
            .operation(self.activity.job_index, self.activity.op_index)
    }

    /// The resource under evaluation.
    pub fn resource(&self) -> &'a Resource {
        &self.scenario.resources[self.resource_index]
    }

    /// Due date of the candidate's job, if any.
    pub fn due_date(&self) -> Option<SimTime> {
        self.scenario.jobs[self.activity.job_index].due_date
    }

    /// Latest committed end on the evaluated resource, or the clock when the
    /// resource is still idle.
    pub fn resource_available_at(&self) -> SimTime {
        self.schedule
            .blocks_on(self.resource_index)
            .map(|b| b.end)
            .max()
            .unwrap_or(self.clock)
    }
}
