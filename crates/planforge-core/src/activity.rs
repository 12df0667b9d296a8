//! Runtime scheduling artifacts
//!
//! Activities, batches, and resource blocks are created when a simulation
//! expands a scenario's operations and are destroyed with the scenario
//! snapshot that owns them. Definitions ([`Job`](crate::Job),
//! [`Operation`](crate::Operation), [`Resource`](crate::Resource)) use string
//! ids; runtime artifacts use dense indices for cheap deterministic lookup.

use crate::time::SimTime;

/// Index of an activity within one schedule's activity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivityId(pub u32);

/// Index of a batch within one schedule's batch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchId(pub u32);

/// Atomic unit of schedulable work, expanded from an [`Operation`](crate::Operation).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Activity {
    pub id: ActivityId,
    pub job_index: usize,
    /// Index of the owning operation within its job.
    pub op_index: usize,
    /// Quantity of input units that must be on hand at start.
    pub required_start_quantity: f64,
    /// Quantity of units produced at finish. Auto-split and auto-join
    /// rewrite both quantity fields together.
    pub required_finish_quantity: f64,
    pub scheduled_start: Option<SimTime>,
    pub scheduled_end: Option<SimTime>,
    /// Resource index reserved for the primary resource requirement.
    pub reservation: Option<usize>,
    /// Anchored activities keep their committed window across replans.
    pub anchored: bool,
    pub batch: Option<BatchId>,
    /// Set when an auto-join folded this activity into a sibling; absorbed
    /// activities are no longer schedulable and hold no quantity.
    pub absorbed: bool,
}

impl Activity {
    /// Creates an unscheduled activity for the given operation slot.
    pub fn new(id: ActivityId, job_index: usize, op_index: usize, quantity: f64) -> Self {
        Self {
            id,
            job_index,
            op_index,
            required_start_quantity: quantity,
            required_finish_quantity: quantity,
            scheduled_start: None,
            scheduled_end: None,
            reservation: None,
            anchored: false,
            batch: None,
            absorbed: false,
        }
    }

    /// Whether this activity has been committed to a resource block.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled_start.is_some()
    }

    /// Whether the simulation still has to place this activity.
    pub fn is_pending(&self) -> bool {
        !self.is_scheduled() && !self.absorbed
    }
}

/// A set of activities scheduled and executed together; members share timing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Batch {
    pub id: BatchId,
    /// Batch family; only same-family activities may share the batch.
    pub family: String,
    pub resource_index: usize,
    pub members: Vec<ActivityId>,
    /// Total quantity folded into this batch so far.
    pub quantity: f64,
    pub start: SimTime,
    pub end: SimTime,
}

impl Batch {
    /// Quantity headroom left under the given batch capacity.
    pub fn remaining_capacity(&self, capacity: f64) -> f64 {
        (capacity - self.quantity).max(0.0)
    }
}

/// A committed interval `[start, end)` of one batch's work on one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceBlock {
    pub resource_index: usize,
    pub batch: BatchId,
    pub start: SimTime,
    pub end: SimTime,
}

impl ResourceBlock {
    /// Whether two blocks overlap in time. Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &ResourceBlock) -> bool {
        self.start < other.end && other.start < self.end
    }
}
