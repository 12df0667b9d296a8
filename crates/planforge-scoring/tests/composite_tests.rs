use std::sync::Arc;

use planforge_core::time::hours;
use planforge_core::{
    ActivityId, Job, Operation, Resource, RuleWeight, RuleWeightSet, Scenario, ScheduleState,
};
use planforge_test::elements::{ConstElement, CountingElement};

use planforge_scoring::composite::{clamp_score, CompositeScorer, SCORE_BOUND};
use planforge_scoring::context::ScoreContext;
use planforge_scoring::element::{Capabilities, MinScorePolicy};
use planforge_scoring::registry::ElementRegistry;

fn fixture() -> (Scenario, ScheduleState) {
    let scenario = Scenario::new("composite")
        .with_resource(Resource::new("mill", "default"))
        .with_job(Job::new("j").with_operation(Operation::new("cut", hours(1))));
    let mut schedule = ScheduleState::new();
    schedule.push_activity(0, 0, 1.0);
    (scenario, schedule)
}

fn ctx<'a>(scenario: &'a Scenario, schedule: &'a ScheduleState) -> ScoreContext<'a> {
    ScoreContext {
        scenario,
        schedule,
        activity: schedule.activity(ActivityId(0)),
        resource_index: 0,
        clock: 0,
        earliest_start: 0,
        resource_multiplier: 1.0,
    }
}

#[test]
fn zero_point_elements_are_never_invoked() {
    let counting = Arc::new(CountingElement::new("stub", 1.0));
    let mut registry = ElementRegistry::new();
    registry.register(counting.clone());
    registry.register(Arc::new(ConstElement::new("active", 2.0)));
    let scorer = CompositeScorer::new(registry);

    let weights = RuleWeightSet::new("ws")
        .with_weight("stub", RuleWeight::with_points(0))
        .with_weight("active", RuleWeight::with_points(3));

    let (scenario, schedule) = fixture();
    let score = scorer.score(&weights, &ctx(&scenario, &schedule));
    assert_eq!(score, 6.0);
    assert_eq!(counting.call_count(), 0);
}

#[test]
fn zero_category_multiplier_also_skips() {
    let counting = Arc::new(CountingElement::new("stub", 1.0));
    let mut registry = ElementRegistry::new();
    registry.register(counting.clone());
    let scorer = CompositeScorer::new(registry);

    let weights = RuleWeightSet::new("ws").with_weight(
        "stub",
        RuleWeight::with_points(50).with_category_multiplier(0.0),
    );

    let (scenario, schedule) = fixture();
    scorer.score(&weights, &ctx(&scenario, &schedule));
    assert_eq!(counting.call_count(), 0);
}

#[test]
fn elements_without_weights_are_inactive() {
    let counting = Arc::new(CountingElement::new("stub", 1.0));
    let mut registry = ElementRegistry::new();
    registry.register(counting.clone());
    let scorer = CompositeScorer::new(registry);

    let (scenario, schedule) = fixture();
    let score = scorer.score(&RuleWeightSet::new("empty"), &ctx(&scenario, &schedule));
    assert_eq!(score, 0.0);
    assert_eq!(counting.call_count(), 0);
}

#[test]
fn weights_without_elements_are_ignored() {
    let scorer = CompositeScorer::new(ElementRegistry::new());
    let weights = RuleWeightSet::new("ws").with_weight("ghost", RuleWeight::with_points(99));
    let (scenario, schedule) = fixture();
    assert_eq!(scorer.score(&weights, &ctx(&scenario, &schedule)), 0.0);
}

#[test]
fn category_multiplier_scales_points() {
    let mut registry = ElementRegistry::new();
    registry.register(Arc::new(ConstElement::new("c", 2.0)));
    let scorer = CompositeScorer::new(registry);
    let weights = RuleWeightSet::new("ws").with_weight(
        "c",
        RuleWeight::with_points(10).with_category_multiplier(0.5),
    );
    let (scenario, schedule) = fixture();
    assert_eq!(scorer.score(&weights, &ctx(&scenario, &schedule)), 10.0);
}

#[test]
fn composite_is_clamped_to_the_symmetric_bound() {
    let mut registry = ElementRegistry::new();
    registry.register(Arc::new(ConstElement::new("huge", 1e30)));
    let scorer = CompositeScorer::new(registry);
    let weights = RuleWeightSet::new("ws").with_weight("huge", RuleWeight::with_points(1_000));
    let (scenario, schedule) = fixture();
    assert_eq!(scorer.score(&weights, &ctx(&scenario, &schedule)), SCORE_BOUND);

    let weights = RuleWeightSet::new("ws").with_weight("huge", RuleWeight::with_points(-1_000));
    assert_eq!(
        scorer.score(&weights, &ctx(&scenario, &schedule)),
        -SCORE_BOUND
    );
}

#[test]
fn nan_composites_map_to_zero() {
    assert_eq!(clamp_score(f64::NAN), 0.0);
    assert_eq!(clamp_score(f64::INFINITY), SCORE_BOUND);
    assert_eq!(clamp_score(f64::NEG_INFINITY), -SCORE_BOUND);
}

#[test]
fn minimum_score_gate_clamps_by_default() {
    let mut registry = ElementRegistry::new();
    registry.register(Arc::new(
        ConstElement::new("gated", -5.0)
            .with_capabilities(Capabilities::weighted().and_minimum_score()),
    ));
    let scorer = CompositeScorer::new(registry);
    let weights =
        RuleWeightSet::new("ws").with_weight("gated", RuleWeight::with_points(2).with_minimum_score(-1.0));
    let (scenario, schedule) = fixture();
    // Clamped to the gate threshold, then weighted.
    assert_eq!(scorer.score(&weights, &ctx(&scenario, &schedule)), -2.0);
}

#[test]
fn reject_policy_drops_the_contribution() {
    let mut registry = ElementRegistry::new();
    registry.register(Arc::new(
        ConstElement::new("gated", -5.0)
            .with_capabilities(Capabilities::weighted().and_minimum_score())
            .with_policy(MinScorePolicy::Reject),
    ));
    registry.register(Arc::new(ConstElement::new("steady", 1.0)));
    let scorer = CompositeScorer::new(registry);
    let weights = RuleWeightSet::new("ws")
        .with_weight("gated", RuleWeight::with_points(2).with_minimum_score(-1.0))
        .with_weight("steady", RuleWeight::with_points(4));
    let (scenario, schedule) = fixture();
    assert_eq!(scorer.score(&weights, &ctx(&scenario, &schedule)), 4.0);
}

#[test]
fn gate_without_capability_is_not_applied() {
    let mut registry = ElementRegistry::new();
    registry.register(Arc::new(ConstElement::new("plain", -5.0)));
    let scorer = CompositeScorer::new(registry);
    let weights = RuleWeightSet::new("ws")
        .with_weight("plain", RuleWeight::with_points(1).with_minimum_score(-1.0));
    let (scenario, schedule) = fixture();
    assert_eq!(scorer.score(&weights, &ctx(&scenario, &schedule)), -5.0);
}

#[test]
fn alternate_resource_multipliers_compose() {
    let mut registry = ElementRegistry::new();
    registry.register(Arc::new(
        ConstElement::new("ar", 2.0)
            .with_capabilities(Capabilities::weighted().and_alternate_resource()),
    ));
    let scorer = CompositeScorer::new(registry);
    let weights = RuleWeightSet::new("ws").with_weight(
        "ar",
        RuleWeight::with_points(3).with_resource_multiplier(2.0),
    );
    let (scenario, schedule) = fixture();
    let mut context = ctx(&scenario, &schedule);
    context.resource_multiplier = 0.5;
    // 2.0 x (0.5 pass x 2.0 weight) x 3 points.
    assert_eq!(scorer.score(&weights, &context), 6.0);
}

#[test]
fn standard_scorer_orders_urgent_work_first() {
    let scorer = CompositeScorer::standard();
    let scenario = Scenario::new("s")
        .with_resource(Resource::new("mill", "default"))
        .with_job(
            Job::new("urgent")
                .with_due_date(hours(2))
                .with_operation(Operation::new("a", hours(1))),
        )
        .with_job(
            Job::new("lazy")
                .with_due_date(hours(40))
                .with_operation(Operation::new("b", hours(1))),
        );
    let mut schedule = ScheduleState::new();
    schedule.push_activity(0, 0, 1.0);
    schedule.push_activity(1, 0, 1.0);
    let weights = RuleWeightSet::new("ws").with_weight("due_date", RuleWeight::with_points(10));

    let score = |activity: u32| {
        let context = ScoreContext {
            scenario: &scenario,
            schedule: &schedule,
            activity: schedule.activity(ActivityId(activity)),
            resource_index: 0,
            clock: 0,
            earliest_start: 0,
            resource_multiplier: 1.0,
        };
        scorer.score(&weights, &context)
    };
    assert!(score(0) > score(1));
}
