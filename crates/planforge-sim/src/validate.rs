//! Pre-start scenario validation
//!
//! Structural checks that must hold before the scheduling loop may start.
//! All problems are collected, not just the first, so a run that ends
//! `Terminated` reports everything wrong with its input at once.
//!
//! Rule-weight-set references are deliberately not validated here: RuleSeek
//! replaces weight sets between validation and the scheduling pass, so the
//! simulation resolves them at runtime instead.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use planforge_core::Scenario;

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    DuplicateResourceId,
    DuplicateJobId,
    DuplicateOperationId,
    UnknownResourceReference,
    UnknownPredecessor,
    EmptyJob,
    UnresolvableOperation,
    NonPositiveQuantity,
    NonPositiveSpan,
    CyclicDependency,
}

/// One validation failure with an engineer-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a scenario, returning every problem found.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut resource_ids = HashSet::new();
    for resource in &scenario.resources {
        if !resource_ids.insert(resource.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateResourceId,
                format!("Duplicate resource id: {}", resource.id),
            ));
        }
    }

    let mut job_ids = HashSet::new();
    let mut op_ids = HashSet::new();
    for job in &scenario.jobs {
        if !job_ids.insert(job.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateJobId,
                format!("Duplicate job id: {}", job.id),
            ));
        }
        if job.operations.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyJob,
                format!("Job {} has no operations", job.id),
            ));
        }
        for op in &job.operations {
            if !op_ids.insert(op.id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateOperationId,
                    format!("Duplicate operation id: {}", op.id),
                ));
            }
            if op.eligible_resources.is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnresolvableOperation,
                    format!("Operation {} has no eligible resources", op.id),
                ));
            }
            for resource_id in &op.eligible_resources {
                if scenario.resource_index(resource_id).is_none() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownResourceReference,
                        format!("Operation {} references unknown resource {resource_id}", op.id),
                    ));
                }
            }
            if op.required_quantity <= 0.0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NonPositiveQuantity,
                    format!(
                        "Operation {} has non-positive quantity {}",
                        op.id, op.required_quantity
                    ),
                ));
            }
            if op.setup_span < 0 || op.run_span < 0 || op.cleanup_span < 0 || op.total_span() <= 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NonPositiveSpan,
                    format!("Operation {} has a non-positive span", op.id),
                ));
            }
        }
    }

    // Predecessor references, then cycles over the precedence graph.
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for job in &scenario.jobs {
        for op in &job.operations {
            let entry = adjacency.entry(op.id.as_str()).or_default();
            for pred in &op.predecessors {
                entry.push(pred.as_str());
            }
        }
    }
    for job in &scenario.jobs {
        for op in &job.operations {
            for pred in &op.predecessors {
                if scenario.find_operation(pred).is_none() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownPredecessor,
                        format!("Operation {} references unknown predecessor {pred}", op.id),
                    ));
                }
            }
        }
    }
    errors.extend(detect_cycles(scenario, &adjacency));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Depth-first search over the precedence graph, reporting each operation
/// where a cycle closes.
fn detect_cycles(
    scenario: &Scenario,
    adjacency: &HashMap<&str, Vec<&str>>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut in_stack: HashSet<&str> = HashSet::new();

    fn visit<'a>(
        op_id: &'a str,
        adjacency: &HashMap<&'a str, Vec<&'a str>>,
        visited: &mut HashSet<&'a str>,
        in_stack: &mut HashSet<&'a str>,
        errors: &mut Vec<ValidationError>,
    ) {
        if in_stack.contains(op_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Operation {op_id} participates in a precedence cycle"),
            ));
            return;
        }
        if !visited.insert(op_id) {
            return;
        }
        in_stack.insert(op_id);
        if let Some(preds) = adjacency.get(op_id) {
            for pred in preds {
                visit(pred, adjacency, visited, in_stack, errors);
            }
        }
        in_stack.remove(op_id);
    }

    for job in &scenario.jobs {
        for op in &job.operations {
            visit(
                op.id.as_str(),
                adjacency,
                &mut visited,
                &mut in_stack,
                &mut errors,
            );
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::time::hours;
    use planforge_core::{Job, Operation, Resource, Scenario};

    fn base_scenario() -> Scenario {
        Scenario::new("valid")
            .with_resource(Resource::new("mill", "default"))
            .with_job(
                Job::new("order")
                    .with_operation(Operation::new("cut", hours(1)).with_resource("mill")),
            )
    }

    fn kinds(result: Result<(), Vec<ValidationError>>) -> Vec<ValidationErrorKind> {
        result.unwrap_err().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn valid_scenario_passes() {
        assert!(validate_scenario(&base_scenario()).is_ok());
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let scenario = base_scenario()
            .with_resource(Resource::new("mill", "default"))
            .with_job(
                Job::new("order")
                    .with_operation(Operation::new("weld", hours(1)).with_resource("mill")),
            );
        let kinds = kinds(validate_scenario(&scenario));
        assert!(kinds.contains(&ValidationErrorKind::DuplicateResourceId));
        assert!(kinds.contains(&ValidationErrorKind::DuplicateJobId));
    }

    #[test]
    fn unknown_references_are_reported() {
        let scenario = Scenario::new("bad")
            .with_resource(Resource::new("mill", "default"))
            .with_job(
                Job::new("order").with_operation(
                    Operation::new("cut", hours(1))
                        .with_resource("ghost")
                        .with_predecessor("nowhere"),
                ),
            );
        let kinds = kinds(validate_scenario(&scenario));
        assert!(kinds.contains(&ValidationErrorKind::UnknownResourceReference));
        assert!(kinds.contains(&ValidationErrorKind::UnknownPredecessor));
    }

    #[test]
    fn precedence_cycles_are_reported() {
        let scenario = Scenario::new("cyclic")
            .with_resource(Resource::new("mill", "default"))
            .with_job(
                Job::new("order")
                    .with_operation(
                        Operation::new("a", hours(1))
                            .with_resource("mill")
                            .with_predecessor("b"),
                    )
                    .with_operation(
                        Operation::new("b", hours(1))
                            .with_resource("mill")
                            .with_predecessor("a"),
                    ),
            );
        assert!(kinds(validate_scenario(&scenario))
            .contains(&ValidationErrorKind::CyclicDependency));
    }

    #[test]
    fn degenerate_operations_are_reported() {
        let scenario = Scenario::new("bad")
            .with_resource(Resource::new("mill", "default"))
            .with_job(Job::new("empty"))
            .with_job(
                Job::new("order").with_operation(
                    Operation::new("cut", hours(1))
                        .with_resource("mill")
                        .with_quantity(0.0),
                ),
            )
            .with_job(
                Job::new("other").with_operation(Operation::new("orphan", hours(1))),
            )
            .with_job(
                Job::new("flat")
                    .with_operation(Operation::new("instant", 0).with_resource("mill")),
            );
        let kinds = kinds(validate_scenario(&scenario));
        assert!(kinds.contains(&ValidationErrorKind::EmptyJob));
        assert!(kinds.contains(&ValidationErrorKind::NonPositiveQuantity));
        assert!(kinds.contains(&ValidationErrorKind::UnresolvableOperation));
        assert!(kinds.contains(&ValidationErrorKind::NonPositiveSpan));
    }

    #[test]
    fn weight_set_references_are_not_validated() {
        // Weight sets are swapped in after validation by the optimizer, so
        // a dangling reference here must not fail the scenario.
        let scenario = Scenario::new("no-sets")
            .with_resource(Resource::new("mill", "missing-set"))
            .with_job(
                Job::new("order")
                    .with_operation(Operation::new("cut", hours(1)).with_resource("mill")),
            );
        assert!(validate_scenario(&scenario).is_ok());
    }
}
