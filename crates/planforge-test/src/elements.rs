//! Instrumented rule elements

use std::sync::atomic::{AtomicUsize, Ordering};

use planforge_core::RuleWeight;
use planforge_scoring::{Capabilities, MinScorePolicy, RuleElement, ScoreContext};

/// Rule element that counts how often it is invoked. The inactive-element
/// contract ("zero effective points means never called") is verified
/// against this counter.
#[derive(Debug)]
pub struct CountingElement {
    id: String,
    score: f64,
    calls: AtomicUsize,
}

impl CountingElement {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `score` has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RuleElement for CountingElement {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::weighted()
    }

    fn score(&self, _ctx: &ScoreContext<'_>, _weight: &RuleWeight) -> f64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.score
    }
}

/// Rule element returning a fixed score, with configurable capabilities
/// and gate policy.
#[derive(Debug)]
pub struct ConstElement {
    id: String,
    score: f64,
    capabilities: Capabilities,
    policy: MinScorePolicy,
}

impl ConstElement {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
            capabilities: Capabilities::weighted(),
            policy: MinScorePolicy::Clamp,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_policy(mut self, policy: MinScorePolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl RuleElement for ConstElement {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn score(&self, _ctx: &ScoreContext<'_>, _weight: &RuleWeight) -> f64 {
        self.score
    }

    fn minimum_score_policy(&self) -> MinScorePolicy {
        self.policy
    }
}
