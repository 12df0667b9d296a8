//! Batch-fill-ratio element

use planforge_core::RuleWeight;

use crate::context::ScoreContext;
use crate::element::{Capabilities, RuleElement};

/// Prefers resources where committing the candidate fills a batch the
/// furthest. Joining an open same-family batch scores its resulting fill
/// ratio; opening a fresh batch scores the candidate's own fill share.
/// Resources without batching are neutral.
#[derive(Debug, Default)]
pub struct BatchFill;

impl RuleElement for BatchFill {
    fn id(&self) -> &str {
        "batch_fill"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::weighted().and_alternate_resource()
    }

    fn score(&self, ctx: &ScoreContext<'_>, _weight: &RuleWeight) -> f64 {
        let Some(capacity) = ctx.resource().batch_capacity else {
            return 0.0;
        };
        if capacity <= 0.0 {
            return 0.0;
        }
        let Some(family) = ctx.operation().batch_family.as_deref() else {
            return 0.0;
        };
        let quantity = ctx.activity.required_finish_quantity;
        let joined_fill = ctx
            .schedule
            .batches()
            .iter()
            .filter(|b| b.resource_index == ctx.resource_index && b.family == family)
            .filter(|b| b.start >= ctx.earliest_start && b.remaining_capacity(capacity) >= quantity)
            .map(|b| (b.quantity + quantity) / capacity)
            .fold(None::<f64>, |best, fill| {
                Some(best.map_or(fill, |b| b.max(fill)))
            });
        match joined_fill {
            Some(fill) => fill.min(1.0),
            None => (quantity / capacity).min(1.0),
        }
    }
}
