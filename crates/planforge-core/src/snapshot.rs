//! Scenario snapshot contract
//!
//! RuleSeek workers never touch the baseline scenario directly; each
//! iteration consumes a fresh isolated copy obtained through
//! [`SnapshotService`]. Versioned persistence and restore formats live
//! behind this contract, outside the core.

use std::sync::Arc;

use crate::error::Result;
use crate::scenario::Scenario;

/// Produces isolated, independently mutable copies of a baseline scenario.
pub trait SnapshotService: Send + Sync {
    fn snapshot(&self) -> Result<Scenario>;
}

/// Snapshot service backed by a deep clone of an in-memory baseline.
#[derive(Clone)]
pub struct CloneSnapshot {
    baseline: Arc<Scenario>,
}

impl CloneSnapshot {
    pub fn new(baseline: Scenario) -> Self {
        Self {
            baseline: Arc::new(baseline),
        }
    }

    /// Read-only view of the baseline.
    pub fn baseline(&self) -> &Scenario {
        &self.baseline
    }
}

impl SnapshotService for CloneSnapshot {
    fn snapshot(&self) -> Result<Scenario> {
        Ok((*self.baseline).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_are_isolated_from_the_baseline() {
        let service = CloneSnapshot::new(Scenario::new("base"));
        let mut copy = service.snapshot().unwrap();
        copy.name.push_str("-mutated");
        copy.clock = 42;
        assert_eq!(service.baseline().name, "base");
        assert_eq!(service.baseline().clock, 0);
    }
}
