//! Job and operation definitions
//!
//! A job is an ordered set of operations; each operation expands into one or
//! more activities when a simulation starts. Operations carry the timing
//! model (setup/run/cleanup spans), availability constraints, and batching
//! hints the simulation core consumes.

use crate::time::SimTime;

/// One processing step of a [`Job`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operation {
    pub id: String,
    /// Ids of operations that must finish before this one may start.
    pub predecessors: Vec<String>,
    /// Total quantity of work units this operation produces.
    pub required_quantity: f64,
    pub setup_span: SimTime,
    pub run_span: SimTime,
    pub cleanup_span: SimTime,
    /// Earliest time this operation may be released to a resource.
    pub release: Option<SimTime>,
    /// Earliest time this operation's input material is available.
    pub material_available: Option<SimTime>,
    /// Resources this operation may be dispatched to, in preference order.
    pub eligible_resources: Vec<String>,
    /// Operations sharing a family may share a batch on a batching resource.
    pub batch_family: Option<String>,
    /// Splits the operation into multiple activities when the required
    /// quantity exceeds this. `None` keeps one activity per operation.
    pub max_quantity_per_activity: Option<f64>,
}

impl Operation {
    /// Creates an operation with the given run span and quantity 1.
    pub fn new(id: impl Into<String>, run_span: SimTime) -> Self {
        Self {
            id: id.into(),
            predecessors: Vec::new(),
            required_quantity: 1.0,
            setup_span: 0,
            run_span,
            cleanup_span: 0,
            release: None,
            material_available: None,
            eligible_resources: Vec::new(),
            batch_family: None,
            max_quantity_per_activity: None,
        }
    }

    /// Adds a predecessor operation id.
    pub fn with_predecessor(mut self, op_id: impl Into<String>) -> Self {
        self.predecessors.push(op_id.into());
        self
    }

    /// Sets the required quantity.
    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.required_quantity = quantity;
        self
    }

    /// Sets setup and cleanup spans around the run span.
    pub fn with_setup_cleanup(mut self, setup: SimTime, cleanup: SimTime) -> Self {
        self.setup_span = setup;
        self.cleanup_span = cleanup;
        self
    }

    /// Sets the release date.
    pub fn with_release(mut self, release: SimTime) -> Self {
        self.release = Some(release);
        self
    }

    /// Sets the material-availability date.
    pub fn with_material_available(mut self, available: SimTime) -> Self {
        self.material_available = Some(available);
        self
    }

    /// Adds an eligible resource id.
    pub fn with_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.eligible_resources.push(resource_id.into());
        self
    }

    /// Marks this operation as batchable within the given family.
    pub fn with_batch_family(mut self, family: impl Into<String>) -> Self {
        self.batch_family = Some(family.into());
        self
    }

    /// Caps the quantity a single activity of this operation may carry.
    pub fn with_max_quantity_per_activity(mut self, max: f64) -> Self {
        self.max_quantity_per_activity = Some(max);
        self
    }

    /// Full occupancy span of one activity: setup, run, and cleanup.
    pub fn total_span(&self) -> SimTime {
        self.setup_span + self.run_span + self.cleanup_span
    }

    /// Earliest time work may begin given the clock, release date, and
    /// material availability.
    pub fn earliest_available(&self, clock: SimTime) -> SimTime {
        let mut t = clock;
        if let Some(release) = self.release {
            t = t.max(release);
        }
        if let Some(material) = self.material_available {
            t = t.max(material);
        }
        t
    }
}

/// A production order: an ordered collection of operations plus due-date
/// metadata the KPI layer reads.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    pub id: String,
    pub name: String,
    pub due_date: Option<SimTime>,
    pub operations: Vec<Operation>,
}

impl Job {
    /// Creates an empty job.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            due_date: None,
            operations: Vec::new(),
        }
    }

    /// Sets a display name distinct from the id.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the due date.
    pub fn with_due_date(mut self, due: SimTime) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Appends an operation.
    pub fn with_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Looks up an operation by id.
    pub fn operation(&self, op_id: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id == op_id)
    }
}
