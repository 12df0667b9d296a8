//! Scenario: the complete in-memory planning dataset for one simulation

use crate::job::{Job, Operation};
use crate::resource::Resource;
use crate::time::{SimTime, DAY};
use crate::weights::RuleWeightSet;

/// Per-scenario scheduling policy windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioSettings {
    /// Window after the clock where no new work may be placed.
    pub frozen_span: SimTime,
    /// Window after the frozen span where changes are discouraged. Advisory;
    /// carried for collaborators that render or compare schedules.
    pub stable_span: SimTime,
    /// Work that cannot start within this horizon is left unscheduled.
    pub planning_horizon: SimTime,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            frozen_span: 0,
            stable_span: 0,
            planning_horizon: 365 * DAY,
        }
    }
}

/// The full planning dataset: resources, jobs, and rule-weight sets, plus
/// the simulation clock and policy settings.
///
/// A scenario is deep-cloned to produce the isolated snapshots RuleSeek
/// workers consume; nothing in it is shared between runs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scenario {
    pub name: String,
    /// Current simulation clock; nothing may be scheduled before it.
    pub clock: SimTime,
    pub settings: ScenarioSettings,
    pub resources: Vec<Resource>,
    pub jobs: Vec<Job>,
    pub weight_sets: Vec<RuleWeightSet>,
}

impl Scenario {
    /// Creates an empty scenario with clock at the epoch.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clock: 0,
            settings: ScenarioSettings::default(),
            resources: Vec::new(),
            jobs: Vec::new(),
            weight_sets: Vec::new(),
        }
    }

    /// Sets the simulation clock.
    pub fn with_clock(mut self, clock: SimTime) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the policy windows.
    pub fn with_settings(mut self, settings: ScenarioSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Appends a resource.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Appends a job.
    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    /// Appends a rule-weight set.
    pub fn with_weight_set(mut self, set: RuleWeightSet) -> Self {
        self.weight_sets.push(set);
        self
    }

    /// Index of the resource with the given id.
    pub fn resource_index(&self, resource_id: &str) -> Option<usize> {
        self.resources.iter().position(|r| r.id == resource_id)
    }

    /// Weight set with the given id.
    pub fn weight_set(&self, set_id: &str) -> Option<&RuleWeightSet> {
        self.weight_sets.iter().find(|s| s.id == set_id)
    }

    /// The operation at a (job, operation) index pair.
    pub fn operation(&self, job_index: usize, op_index: usize) -> &Operation {
        &self.jobs[job_index].operations[op_index]
    }

    /// Finds an operation by id across all jobs.
    pub fn find_operation(&self, op_id: &str) -> Option<(usize, usize)> {
        self.jobs.iter().enumerate().find_map(|(ji, job)| {
            job.operations
                .iter()
                .position(|op| op.id == op_id)
                .map(|oi| (ji, oi))
        })
    }

    /// Earliest time non-anchored work may be placed: the clock pushed past
    /// the frozen window.
    pub fn dispatch_floor(&self) -> SimTime {
        self.clock + self.settings.frozen_span
    }

    /// Latest time work may still start.
    pub fn horizon_end(&self) -> SimTime {
        self.clock.saturating_add(self.settings.planning_horizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::hours;
    use crate::weights::RuleWeight;

    #[test]
    fn lookups_resolve_ids_to_indices() {
        let scenario = Scenario::new("plant")
            .with_resource(Resource::new("mill", "default"))
            .with_resource(Resource::new("lathe", "default"))
            .with_weight_set(
                RuleWeightSet::new("default").with_weight("due_date", RuleWeight::with_points(10)),
            )
            .with_job(Job::new("order").with_operation(Operation::new("cut", hours(1))));

        assert_eq!(scenario.resource_index("lathe"), Some(1));
        assert_eq!(scenario.resource_index("drill"), None);
        assert!(scenario.weight_set("default").is_some());
        assert_eq!(scenario.find_operation("cut"), Some((0, 0)));
    }

    #[test]
    fn dispatch_floor_includes_frozen_span() {
        let scenario = Scenario::new("plant").with_clock(hours(10)).with_settings(
            ScenarioSettings {
                frozen_span: hours(2),
                ..ScenarioSettings::default()
            },
        );
        assert_eq!(scenario.dispatch_floor(), hours(12));
    }
}
