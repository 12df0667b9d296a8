//! Critical-ratio element

use planforge_core::time::span_hours;
use planforge_core::RuleWeight;

use crate::context::ScoreContext;
use crate::element::{Capabilities, MinScorePolicy, RuleElement};

/// Prefers candidates whose job has the least due-date slack per hour of
/// remaining work. Remaining work is the summed occupancy span of the job's
/// still-pending activities.
#[derive(Debug, Default)]
pub struct CriticalRatio;

impl RuleElement for CriticalRatio {
    fn id(&self) -> &str {
        "critical_ratio"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::weighted().and_minimum_score()
    }

    fn score(&self, ctx: &ScoreContext<'_>, _weight: &RuleWeight) -> f64 {
        let Some(due) = ctx.due_date() else {
            return 0.0;
        };
        let remaining: f64 = ctx
            .schedule
            .activities()
            .iter()
            .filter(|a| a.job_index == ctx.activity.job_index && a.is_pending())
            .map(|a| span_hours(ctx.scenario.operation(a.job_index, a.op_index).total_span()))
            .sum();
        if remaining <= 0.0 {
            return 0.0;
        }
        -(span_hours(due - ctx.clock) / remaining)
    }

    fn minimum_score_policy(&self) -> MinScorePolicy {
        MinScorePolicy::Reject
    }
}
