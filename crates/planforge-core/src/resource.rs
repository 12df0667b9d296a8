//! Resource definitions

/// How many blocks a resource can execute at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capacity {
    /// One block at a time; committed blocks must never overlap.
    Single,
    /// Up to the given number of simultaneous blocks.
    Parallel(u32),
}

impl Capacity {
    /// Number of simultaneous block slots this capacity allows.
    pub fn slots(self) -> u32 {
        match self {
            Capacity::Single => 1,
            Capacity::Parallel(n) => n.max(1),
        }
    }
}

/// A finite-capacity resource activities are dispatched to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    pub id: String,
    pub name: String,
    /// Id of the [`RuleWeightSet`](crate::RuleWeightSet) scoring uses here.
    pub weight_set: String,
    pub capacity: Capacity,
    /// Multiplier applied when comparing this resource against alternates
    /// during one scoring pass.
    pub dispatch_multiplier: f64,
    /// Maximum total quantity one batch on this resource may carry.
    /// `None` disables batching here.
    pub batch_capacity: Option<f64>,
}

impl Resource {
    /// Creates a single-tasking resource with neutral dispatch settings.
    pub fn new(id: impl Into<String>, weight_set: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            weight_set: weight_set.into(),
            capacity: Capacity::Single,
            dispatch_multiplier: 1.0,
            batch_capacity: None,
        }
    }

    /// Sets a display name distinct from the id.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the capacity model.
    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the alternate-resource dispatch multiplier.
    pub fn with_dispatch_multiplier(mut self, multiplier: f64) -> Self {
        self.dispatch_multiplier = multiplier;
        self
    }

    /// Enables batching up to the given total quantity per batch.
    pub fn with_batch_capacity(mut self, capacity: f64) -> Self {
        self.batch_capacity = Some(capacity);
        self
    }
}
