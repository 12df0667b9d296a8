//! Queue-pressure element

use planforge_core::time::span_hours;
use planforge_core::RuleWeight;

use crate::context::ScoreContext;
use crate::element::{Capabilities, RuleElement};

/// Prefers resources that free up soonest, measured as hours of committed
/// work still ahead of the clock on the evaluated resource.
#[derive(Debug, Default)]
pub struct QueuePressure;

impl RuleElement for QueuePressure {
    fn id(&self) -> &str {
        "queue_pressure"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::weighted().and_alternate_resource()
    }

    fn score(&self, ctx: &ScoreContext<'_>, _weight: &RuleWeight) -> f64 {
        let backlog = (ctx.resource_available_at() - ctx.clock).max(0);
        -span_hours(backlog)
    }
}
