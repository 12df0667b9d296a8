//! Best-score bookkeeping for one RuleSeek run
//!
//! Workers race to place their results into a single bounded [`TopScores`]
//! set owned by the session. A submission qualifies against whatever the set
//! holds at insertion time, so a result computed before a better one was
//! committed is simply rejected when its turn at the lock comes.

use std::sync::Mutex;

use planforge_core::{KpiDirection, RuleWeightSet};

/// Immutable record of one schedule that qualified for the Top-K set.
#[derive(Debug, Clone)]
pub struct RuleSeekScore {
    /// KPI value of the schedule the weights produced.
    pub value: f64,
    /// Which way the KPI improves.
    pub direction: KpiDirection,
    /// The rule-weight sets that produced the value, snapshotted at
    /// acceptance so the caller can re-apply them.
    pub weight_sets: Vec<RuleWeightSet>,
}

/// How the Top-K set ruled on a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Accepted as the new best score of the run.
    Best,
    /// Accepted into the set below the current best.
    Retained,
    /// Did not qualify against the scores present at insertion time.
    Rejected,
}

impl Acceptance {
    /// Whether the submission entered the set at all.
    pub fn is_accepted(self) -> bool {
        !matches!(self, Acceptance::Rejected)
    }
}

/// Bounded best-score set shared by every worker of one run.
///
/// Entries are kept ordered best-first. Once the set is full, a submission
/// must strictly improve on the worst retained entry or it is rejected; ties
/// keep the earlier submission ahead.
pub struct TopScores {
    capacity: usize,
    direction: KpiDirection,
    entries: Mutex<Vec<RuleSeekScore>>,
}

impl TopScores {
    /// Creates an empty set retaining at most `capacity` scores.
    pub fn new(capacity: usize, direction: KpiDirection) -> Self {
        Self {
            capacity: capacity.max(1),
            direction,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn direction(&self) -> KpiDirection {
        self.direction
    }

    /// Offers a score to the set.
    ///
    /// Acceptance is decided entirely under the lock: a full set rejects any
    /// value that does not improve on its worst entry, and an accepted value
    /// that lands at the front is reported as the new best.
    pub fn submit(&self, score: RuleSeekScore) -> Acceptance {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity {
            let worst = entries[entries.len() - 1].value;
            if !self.direction.improves(score.value, worst) {
                return Acceptance::Rejected;
            }
            entries.pop();
        }
        let at = entries.partition_point(|held| !self.direction.improves(score.value, held.value));
        entries.insert(at, score);
        if at == 0 {
            Acceptance::Best
        } else {
            Acceptance::Retained
        }
    }

    /// The current best score, if any submission was accepted yet.
    pub fn best(&self) -> Option<RuleSeekScore> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .first()
            .cloned()
    }

    /// Snapshot of the retained scores, ordered best-first.
    pub fn snapshot(&self) -> Vec<RuleSeekScore> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether a previously accepted value is still among the retained
    /// scores. Delivery uses this to drop results displaced while pending.
    pub fn contains_value(&self, value: f64) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|held| held.value == value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TopScores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopScores")
            .field("capacity", &self.capacity)
            .field("direction", &self.direction)
            .field("len", &self.len())
            .finish()
    }
}
