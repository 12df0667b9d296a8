//! Event ordering engine
//!
//! [`CandidateQueue`] hands the simulation its next candidate: minimum key
//! first, and among equal keys, first inserted first. Identical inputs plus
//! identical insertion order therefore reproduce the exact same processing
//! sequence, which is what the simulation's determinism guarantee rests on.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use planforge_core::{ActivityId, SimTime};

/// Domain ordering key: a resource-availability time paired with the
/// activity evaluated against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateKey {
    pub time: SimTime,
    pub activity: ActivityId,
}

impl Ord for CandidateKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.activity.cmp(&other.activity))
    }
}

impl PartialOrd for CandidateKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Entry {
    key: CandidateKey,
    seq: u64,
}

// BinaryHeap is a max-heap; reverse the comparison so the minimum
// (key, seq) pops first.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue with deterministic tie-breaking by insertion sequence.
#[derive(Debug, Default)]
pub struct CandidateQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a candidate; its sequence number is assigned internally and
    /// increases monotonically with each insertion.
    pub fn push(&mut self, key: CandidateKey) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { key, seq });
    }

    /// Removes and returns the minimum candidate; among equal keys, the
    /// one inserted first.
    pub fn pop(&mut self) -> Option<CandidateKey> {
        self.heap.pop().map(|e| e.key)
    }

    /// The candidate `pop` would return next.
    pub fn peek(&self) -> Option<&CandidateKey> {
        self.heap.peek().map(|e| &e.key)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
