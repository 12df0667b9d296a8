//! Ready-made scenarios
//!
//! Kept deliberately small: three activities for the precedence chain, two
//! jobs for the job shop, a single oven for batching. Tests that need
//! volume build on these with loops rather than new fixtures.

use planforge_core::time::{hours, HOUR};
use planforge_core::{Job, Operation, Resource, RuleWeight, RuleWeightSet, Scenario};

/// Weight set activating the common heuristics with mid-range points.
pub fn default_weights() -> RuleWeightSet {
    RuleWeightSet::new("default")
        .with_weight("due_date", RuleWeight::with_points(40))
        .with_weight("release_slack", RuleWeight::with_points(20))
        .with_weight("queue_pressure", RuleWeight::with_points(10))
}

/// Three-activity chain `a -> b -> c` on three distinct single-tasking
/// resources: zero setup/cleanup, one-hour runs, release at the clock.
pub fn chain_scenario() -> Scenario {
    Scenario::new("chain")
        .with_resource(Resource::new("r1", "default"))
        .with_resource(Resource::new("r2", "default"))
        .with_resource(Resource::new("r3", "default"))
        .with_weight_set(default_weights())
        .with_job(
            Job::new("order")
                .with_due_date(hours(8))
                .with_operation(Operation::new("a", HOUR).with_release(0).with_resource("r1"))
                .with_operation(
                    Operation::new("b", HOUR)
                        .with_predecessor("a")
                        .with_resource("r2"),
                )
                .with_operation(
                    Operation::new("c", HOUR)
                        .with_predecessor("b")
                        .with_resource("r3"),
                ),
        )
}

/// Two jobs of three operations each, sharing three resources, with
/// alternate resources on the middle operations and distinct due dates.
pub fn job_shop_scenario() -> Scenario {
    Scenario::new("job-shop")
        .with_resource(Resource::new("mill", "default"))
        .with_resource(Resource::new("lathe", "default"))
        .with_resource(Resource::new("drill", "default"))
        .with_weight_set(default_weights())
        .with_job(
            Job::new("gear")
                .with_due_date(hours(10))
                .with_operation(Operation::new("gear-cut", hours(2)).with_resource("mill"))
                .with_operation(
                    Operation::new("gear-turn", HOUR)
                        .with_predecessor("gear-cut")
                        .with_resource("lathe")
                        .with_resource("mill"),
                )
                .with_operation(
                    Operation::new("gear-bore", HOUR)
                        .with_predecessor("gear-turn")
                        .with_resource("drill"),
                ),
        )
        .with_job(
            Job::new("shaft")
                .with_due_date(hours(6))
                .with_operation(Operation::new("shaft-turn", hours(2)).with_resource("lathe"))
                .with_operation(
                    Operation::new("shaft-mill", HOUR)
                        .with_predecessor("shaft-turn")
                        .with_resource("mill")
                        .with_resource("lathe"),
                )
                .with_operation(
                    Operation::new("shaft-bore", HOUR)
                        .with_predecessor("shaft-mill")
                        .with_resource("drill"),
                ),
        )
}

/// One batching oven (capacity 10) fed by same-family anneal operations,
/// including a 12-unit operation that overflows a single batch and a
/// pre-split operation capped at 5 units per activity.
pub fn batching_scenario() -> Scenario {
    Scenario::new("batching")
        .with_resource(
            Resource::new("oven", "default")
                .with_name("anneal oven")
                .with_batch_capacity(10.0),
        )
        .with_weight_set(
            default_weights().with_weight("batch_fill", RuleWeight::with_points(30)),
        )
        .with_job(
            Job::new("coils").with_operation(
                Operation::new("anneal-coils", hours(2))
                    .with_quantity(12.0)
                    .with_batch_family("anneal")
                    .with_resource("oven"),
            ),
        )
        .with_job(
            Job::new("plates").with_operation(
                Operation::new("anneal-plates", hours(2))
                    .with_quantity(8.0)
                    .with_max_quantity_per_activity(5.0)
                    .with_batch_family("anneal")
                    .with_resource("oven"),
            ),
        )
        .with_job(
            Job::new("rods").with_operation(
                Operation::new("anneal-rods", hours(2))
                    .with_quantity(3.0)
                    .with_batch_family("anneal")
                    .with_resource("oven"),
            ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_scenario_matches_its_contract() {
        let scenario = chain_scenario();
        assert_eq!(scenario.resources.len(), 3);
        let ops = &scenario.jobs[0].operations;
        assert_eq!(ops.len(), 3);
        assert!(ops.iter().all(|op| op.setup_span == 0 && op.cleanup_span == 0));
        assert!(ops.iter().all(|op| op.run_span == HOUR));
        assert_eq!(ops[1].predecessors, ["a"]);
        assert_eq!(ops[2].predecessors, ["b"]);
    }

    #[test]
    fn fixtures_reference_known_resources() {
        for scenario in [chain_scenario(), job_shop_scenario(), batching_scenario()] {
            for job in &scenario.jobs {
                for op in &job.operations {
                    for rid in &op.eligible_resources {
                        assert!(
                            scenario.resource_index(rid).is_some(),
                            "{} references unknown resource {rid}",
                            op.id
                        );
                    }
                }
            }
        }
    }
}
