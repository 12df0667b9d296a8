//! Release-slack element

use planforge_core::time::span_hours;
use planforge_core::RuleWeight;

use crate::context::ScoreContext;
use crate::element::{Capabilities, RuleElement};

/// Prefers candidates that can start soonest, measured as the gap between
/// the clock and the candidate's earliest feasible start.
#[derive(Debug, Default)]
pub struct ReleaseSlack;

impl RuleElement for ReleaseSlack {
    fn id(&self) -> &str {
        "release_slack"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::weighted()
    }

    fn score(&self, ctx: &ScoreContext<'_>, _weight: &RuleWeight) -> f64 {
        -span_hours(ctx.earliest_start - ctx.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::time::hours;
    use planforge_core::{ActivityId, Job, Operation, Resource, Scenario, ScheduleState};

    #[test]
    fn ready_now_beats_ready_later() {
        let scenario = Scenario::new("s")
            .with_resource(Resource::new("mill", "default"))
            .with_job(Job::new("j").with_operation(Operation::new("cut", hours(1))));
        let mut schedule = ScheduleState::new();
        schedule.push_activity(0, 0, 1.0);
        let score = |earliest_start: i64| {
            let ctx = ScoreContext {
                scenario: &scenario,
                schedule: &schedule,
                activity: schedule.activity(ActivityId(0)),
                resource_index: 0,
                clock: 0,
                earliest_start,
                resource_multiplier: 1.0,
            };
            ReleaseSlack.score(&ctx, &RuleWeight::with_points(1))
        };
        assert_eq!(score(0), 0.0);
        assert!(score(0) > score(hours(4)));
    }
}
