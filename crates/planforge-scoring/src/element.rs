//! Rule-element abstraction
//!
//! Every dispatch rule is one [`RuleElement`] exposing a flat
//! [`Capabilities`] set the composite scorer queries at composition time.
//! Higher scores always mean a more attractive candidate.

use planforge_core::RuleWeight;

use crate::context::ScoreContext;

/// Optional capabilities a rule element may declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Participates in weighted composition (every shipped element does).
    pub weighted: bool,
    /// Reads free-form settings off its [`RuleWeight`].
    pub configurable: bool,
    /// Supports the minimum-score gate.
    pub minimum_score: bool,
    /// Applies an early-release-window penalty curve.
    pub early_window: bool,
    /// Score varies across resources and honours the pass-level resource
    /// multiplier.
    pub alternate_resource: bool,
}

impl Capabilities {
    /// Baseline capability set: weighted composition only.
    pub const fn weighted() -> Self {
        Self {
            weighted: true,
            configurable: false,
            minimum_score: false,
            early_window: false,
            alternate_resource: false,
        }
    }

    pub const fn and_configurable(mut self) -> Self {
        self.configurable = true;
        self
    }

    pub const fn and_minimum_score(mut self) -> Self {
        self.minimum_score = true;
        self
    }

    pub const fn and_early_window(mut self) -> Self {
        self.early_window = true;
        self
    }

    pub const fn and_alternate_resource(mut self) -> Self {
        self.alternate_resource = true;
        self
    }
}

/// What to do when a gated element scores below its minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinScorePolicy {
    /// Raise the score to the minimum and keep the contribution.
    #[default]
    Clamp,
    /// Drop the contribution from the composite entirely.
    Reject,
}

/// A pluggable scoring function contributing to the composite candidate
/// score.
///
/// Implementations must be pure with respect to the context: same context,
/// same score. The composite scorer skips elements whose effective points
/// are zero, so `score` is only ever called for active elements.
pub trait RuleElement: Send + Sync {
    /// Stable identifier rule-weight sets refer to.
    fn id(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Scores one candidate. `weight` is the entry that activated this
    /// element; configurable elements read their settings from it.
    fn score(&self, ctx: &ScoreContext<'_>, weight: &RuleWeight) -> f64;

    /// Gate policy applied when the weight enables the minimum-score gate.
    fn minimum_score_policy(&self) -> MinScorePolicy {
        MinScorePolicy::Clamp
    }
}
