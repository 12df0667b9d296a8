//! Earliest-due-date element

use planforge_core::time::span_hours;
use planforge_core::RuleWeight;

use crate::context::ScoreContext;
use crate::element::{Capabilities, RuleElement};

/// Prefers candidates whose job is due soonest. Jobs without a due date
/// contribute nothing.
#[derive(Debug, Default)]
pub struct EarliestDueDate;

impl RuleElement for EarliestDueDate {
    fn id(&self) -> &str {
        "due_date"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::weighted().and_minimum_score()
    }

    fn score(&self, ctx: &ScoreContext<'_>, _weight: &RuleWeight) -> f64 {
        match ctx.due_date() {
            Some(due) => -span_hours(due - ctx.clock),
            None => 0.0,
        }
    }
}
