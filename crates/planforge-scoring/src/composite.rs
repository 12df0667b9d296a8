//! Composite candidate scoring
//!
//! The composite score of one (activity, resource) candidate is the sum of
//! `element_score x effective_points` over the active elements of the
//! resource's rule-weight set. Elements with zero effective points are
//! never invoked; with hundreds of registered elements and one weight set
//! per resource, the skip is what keeps scoring cheap.

use planforge_core::RuleWeightSet;

use crate::context::ScoreContext;
use crate::element::MinScorePolicy;
use crate::registry::ElementRegistry;

/// Symmetric bound the composite score is clamped to, stopping runaway
/// weight configurations from overflowing downstream comparisons.
pub const SCORE_BOUND: f64 = 1e20;

/// Clamps a composite score into `[-SCORE_BOUND, SCORE_BOUND]`; NaN maps
/// to zero so a poisoned element can never win or veto a candidate.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(-SCORE_BOUND, SCORE_BOUND)
}

/// Scores candidates by composing the registered rule elements under a
/// rule-weight set.
#[derive(Clone, Default)]
pub struct CompositeScorer {
    registry: ElementRegistry,
}

impl CompositeScorer {
    pub fn new(registry: ElementRegistry) -> Self {
        Self { registry }
    }

    /// Scorer over the standard element library.
    pub fn standard() -> Self {
        Self::new(ElementRegistry::standard())
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Composite score for one candidate under one weight set.
    ///
    /// Elements run in registration order. Per element: skip unless the
    /// weight set carries an active weight for it; apply the pass-level
    /// resource multiplier for alternate-resource elements; honour the
    /// minimum-score gate per the element's declared policy; accumulate
    /// `score x effective_points`. The sum is clamped to [`SCORE_BOUND`].
    pub fn score(&self, weights: &RuleWeightSet, ctx: &ScoreContext<'_>) -> f64 {
        let mut composite = 0.0;
        for element in self.registry.iter() {
            let Some(weight) = weights.weight(element.id()) else {
                continue;
            };
            let points = weight.effective_points();
            if points == 0.0 {
                continue;
            }
            let caps = element.capabilities();
            let mut score = element.score(ctx, weight);
            if caps.alternate_resource {
                score *= ctx.resource_multiplier * weight.resource_multiplier;
            }
            if caps.minimum_score && weight.use_minimum_score && score < weight.minimum_score {
                match element.minimum_score_policy() {
                    MinScorePolicy::Clamp => score = weight.minimum_score,
                    MinScorePolicy::Reject => continue,
                }
            }
            composite += score * points;
        }
        clamp_score(composite)
    }
}
