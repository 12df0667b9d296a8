//! Rule-weight perturbation
//!
//! Each RuleSeek iteration redraws integer point values for the weights it
//! is allowed to touch. Draws are bounded by the configured step and keep
//! the sign of the original weight, so a rule tuned to penalize keeps
//! penalizing. [`PerturbMode::All`] additionally wakes dormant rules by
//! giving zero-point weights a positive draw.

use planforge_config::PerturbMode;
use planforge_core::RuleWeightSet;
use rand::Rng;

/// Redraws the points of every eligible weight across the given sets.
///
/// `max_point_step` bounds the drawn magnitude; values land in
/// `1..=max_point_step` carrying the original sign. Everything but the
/// points (multipliers, gates, settings) is left untouched.
pub fn perturb_weight_sets<R: Rng>(
    sets: &mut [RuleWeightSet],
    mode: PerturbMode,
    max_point_step: i32,
    rng: &mut R,
) {
    for set in sets {
        for (_, weight) in set.iter_mut() {
            if weight.points == 0 && mode == PerturbMode::InUseOnly {
                continue;
            }
            weight.points = draw_points(weight.points, max_point_step, rng);
        }
    }
}

fn draw_points<R: Rng>(original: i32, max_point_step: i32, rng: &mut R) -> i32 {
    let magnitude = rng.random_range(1..=max_point_step.max(1));
    if original < 0 {
        -magnitude
    } else {
        magnitude
    }
}
