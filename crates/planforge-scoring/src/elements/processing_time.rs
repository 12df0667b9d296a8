//! Shortest-processing-time element

use planforge_core::time::span_hours;
use planforge_core::RuleWeight;

use crate::context::ScoreContext;
use crate::element::{Capabilities, RuleElement};

/// Prefers candidates with the shortest run span.
#[derive(Debug, Default)]
pub struct ShortestProcessingTime;

impl RuleElement for ShortestProcessingTime {
    fn id(&self) -> &str {
        "processing_time"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::weighted()
    }

    fn score(&self, ctx: &ScoreContext<'_>, _weight: &RuleWeight) -> f64 {
        -span_hours(ctx.operation().run_span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::time::hours;
    use planforge_core::{ActivityId, Job, Operation, Resource, Scenario, ScheduleState};

    #[test]
    fn shorter_runs_score_higher() {
        let scenario = Scenario::new("s")
            .with_resource(Resource::new("mill", "default"))
            .with_job(
                Job::new("j")
                    .with_operation(Operation::new("short", hours(1)))
                    .with_operation(Operation::new("long", hours(5))),
            );
        let mut schedule = ScheduleState::new();
        schedule.push_activity(0, 0, 1.0);
        schedule.push_activity(0, 1, 1.0);
        let score = |activity: u32| {
            let ctx = ScoreContext {
                scenario: &scenario,
                schedule: &schedule,
                activity: schedule.activity(ActivityId(activity)),
                resource_index: 0,
                clock: 0,
                earliest_start: 0,
                resource_multiplier: 1.0,
            };
            ShortestProcessingTime.score(&ctx, &RuleWeight::with_points(1))
        };
        assert!(score(0) > score(1));
        assert_eq!(score(0), -1.0);
    }
}
