//! Schedule state produced by a simulation run
//!
//! [`ScheduleState`] owns the activity, batch, and block tables for one run.
//! The simulation core mutates it; the KPI layer and the consistency checker
//! read it. Blocks are stored in commit order, which is the sequence the
//! determinism guarantee is stated over.

use crate::activity::{Activity, ActivityId, Batch, BatchId, ResourceBlock};
use crate::time::SimTime;

/// Mutable schedule for one simulation run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleState {
    activities: Vec<Activity>,
    batches: Vec<Batch>,
    blocks: Vec<ResourceBlock>,
}

impl ScheduleState {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an activity, assigning its id from the table position.
    pub fn push_activity(&mut self, job_index: usize, op_index: usize, quantity: f64) -> ActivityId {
        let id = ActivityId(self.activities.len() as u32);
        self.activities
            .push(Activity::new(id, job_index, op_index, quantity));
        id
    }

    /// Adds a batch, assigning its id from the table position.
    pub fn push_batch(
        &mut self,
        family: impl Into<String>,
        resource_index: usize,
        start: SimTime,
        end: SimTime,
    ) -> BatchId {
        let id = BatchId(self.batches.len() as u32);
        self.batches.push(Batch {
            id,
            family: family.into(),
            resource_index,
            members: Vec::new(),
            quantity: 0.0,
            start,
            end,
        });
        id
    }

    /// Appends a committed block.
    pub fn commit_block(&mut self, block: ResourceBlock) {
        self.blocks.push(block);
    }

    pub fn activity(&self, id: ActivityId) -> &Activity {
        &self.activities[id.0 as usize]
    }

    pub fn activity_mut(&mut self, id: ActivityId) -> &mut Activity {
        &mut self.activities[id.0 as usize]
    }

    pub fn batch(&self, id: BatchId) -> &Batch {
        &self.batches[id.0 as usize]
    }

    pub fn batch_mut(&mut self, id: BatchId) -> &mut Batch {
        &mut self.batches[id.0 as usize]
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// All committed blocks, in commit order.
    pub fn blocks(&self) -> &[ResourceBlock] {
        &self.blocks
    }

    /// Committed blocks on one resource, in commit order.
    pub fn blocks_on(&self, resource_index: usize) -> impl Iterator<Item = &ResourceBlock> {
        self.blocks
            .iter()
            .filter(move |b| b.resource_index == resource_index)
    }

    /// Number of activities still to be placed. Absorbed activities no
    /// longer count toward the denominator.
    pub fn pending_count(&self) -> usize {
        self.activities.iter().filter(|a| a.is_pending()).count()
    }

    /// Number of activities that count toward progress reporting.
    pub fn schedulable_count(&self) -> usize {
        self.activities.iter().filter(|a| !a.absorbed).count()
    }

    /// Number of activities already committed.
    pub fn scheduled_count(&self) -> usize {
        self.activities.iter().filter(|a| a.is_scheduled()).count()
    }

    /// Latest scheduled end of any activity of the given job.
    pub fn job_completion(&self, job_index: usize) -> Option<SimTime> {
        self.activities
            .iter()
            .filter(|a| a.job_index == job_index)
            .filter_map(|a| a.scheduled_end)
            .max()
    }

    /// Latest scheduled end across the whole schedule.
    pub fn makespan_end(&self) -> Option<SimTime> {
        self.activities.iter().filter_map(|a| a.scheduled_end).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::hours;

    #[test]
    fn activity_ids_follow_table_positions() {
        let mut state = ScheduleState::new();
        let a = state.push_activity(0, 0, 1.0);
        let b = state.push_activity(0, 1, 1.0);
        assert_eq!(a, ActivityId(0));
        assert_eq!(b, ActivityId(1));
        assert_eq!(state.pending_count(), 2);
    }

    #[test]
    fn job_completion_takes_latest_end() {
        let mut state = ScheduleState::new();
        let a = state.push_activity(0, 0, 1.0);
        let b = state.push_activity(0, 1, 1.0);
        state.activity_mut(a).scheduled_start = Some(0);
        state.activity_mut(a).scheduled_end = Some(hours(1));
        state.activity_mut(b).scheduled_start = Some(hours(1));
        state.activity_mut(b).scheduled_end = Some(hours(3));
        assert_eq!(state.job_completion(0), Some(hours(3)));
        assert_eq!(state.job_completion(1), None);
        assert_eq!(state.makespan_end(), Some(hours(3)));
    }

    #[test]
    fn absorbed_activities_leave_the_denominator() {
        let mut state = ScheduleState::new();
        let a = state.push_activity(0, 0, 2.0);
        state.push_activity(0, 0, 2.0);
        state.activity_mut(a).absorbed = true;
        assert_eq!(state.schedulable_count(), 1);
        assert_eq!(state.pending_count(), 1);
    }
}
