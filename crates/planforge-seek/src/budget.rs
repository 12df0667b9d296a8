//! CPU-budget admission control
//!
//! The session polls a [`CpuBudget`] once per admission tick and adjusts the
//! worker pool toward the returned target: one start or stop per tick, so the
//! pool converges in at most `|active - floor(target)|` ticks. A fractional
//! target is served by delaying one worker a matching fraction of each tick
//! rather than by oversubscribing a whole core.

use std::time::Duration;

/// Desired concurrent worker count, re-evaluated every admission tick.
///
/// Implementations may measure machine load, read a host-imposed quota, or
/// pin a constant. Returning `0.0` drains the pool without cancelling the
/// run.
pub trait CpuBudget: Send + Sync {
    /// Target worker count; the fractional part is served by throttling.
    fn target_workers(&self) -> f64;
}

/// Budget pinned to a constant target.
#[derive(Debug, Clone, Copy)]
pub struct FixedBudget {
    target: f64,
}

impl FixedBudget {
    pub fn new(target: f64) -> Self {
        Self {
            target: if target.is_nan() { 0.0 } else { target.max(0.0) },
        }
    }
}

impl CpuBudget for FixedBudget {
    fn target_workers(&self) -> f64 {
        self.target
    }
}

/// What the admission loop does with the pool this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdmissionAction {
    /// Start one worker.
    Start,
    /// Stop the most recently started worker.
    Stop,
    /// Keep the count; delay one worker by `throttle` of the tick.
    Hold { throttle: f64 },
}

/// Decides the pool adjustment for one tick.
///
/// `active` is the live worker count and `target` the budget's desire,
/// capped at `max_workers`. Below the integer floor of the target one worker
/// starts; above it the most recently started stops; exactly at the floor
/// the fractional remainder becomes a proportional delay for one worker.
pub fn admission_action(active: usize, target: f64, max_workers: usize) -> AdmissionAction {
    let capped = if target.is_nan() {
        0.0
    } else {
        target.clamp(0.0, max_workers as f64)
    };
    let floor = capped.floor() as usize;
    if active < floor {
        AdmissionAction::Start
    } else if active > floor {
        AdmissionAction::Stop
    } else {
        AdmissionAction::Hold {
            throttle: capped.fract(),
        }
    }
}

/// Delay injected into one worker when holding at a fractional target.
pub fn throttle_delay(tick: Duration, throttle: f64) -> Duration {
    tick.mul_f64(throttle.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_the_floor_starts_a_worker() {
        assert_eq!(admission_action(0, 2.0, 8), AdmissionAction::Start);
        assert_eq!(admission_action(1, 2.0, 8), AdmissionAction::Start);
        assert_eq!(admission_action(3, 6.9, 8), AdmissionAction::Start);
    }

    #[test]
    fn above_the_floor_stops_a_worker() {
        assert_eq!(admission_action(3, 2.0, 8), AdmissionAction::Stop);
        assert_eq!(admission_action(5, 2.5, 8), AdmissionAction::Stop);
        assert_eq!(admission_action(1, 0.0, 8), AdmissionAction::Stop);
    }

    #[test]
    fn at_an_integer_target_the_pool_holds_steady() {
        assert_eq!(
            admission_action(2, 2.0, 8),
            AdmissionAction::Hold { throttle: 0.0 }
        );
        assert_eq!(
            admission_action(0, 0.0, 8),
            AdmissionAction::Hold { throttle: 0.0 }
        );
    }

    #[test]
    fn a_fractional_target_holds_with_a_matching_throttle() {
        match admission_action(2, 2.5, 8) {
            AdmissionAction::Hold { throttle } => assert!((throttle - 0.5).abs() < 1e-12),
            other => panic!("expected a hold, got {other:?}"),
        }
        match admission_action(1, 1.25, 8) {
            AdmissionAction::Hold { throttle } => assert!((throttle - 0.25).abs() < 1e-12),
            other => panic!("expected a hold, got {other:?}"),
        }
    }

    #[test]
    fn the_cap_bounds_runaway_targets() {
        assert_eq!(admission_action(4, 64.0, 4), AdmissionAction::Hold { throttle: 0.0 });
        assert_eq!(admission_action(3, 64.0, 4), AdmissionAction::Start);
        assert_eq!(admission_action(2, f64::INFINITY, 4), AdmissionAction::Start);
        assert_eq!(admission_action(0, f64::NAN, 4), AdmissionAction::Hold { throttle: 0.0 });
    }

    #[test]
    fn repeated_ticks_converge_to_the_floor() {
        // Property check: from either side of the target the one-step rule
        // reaches floor(target) in |active - floor| ticks and stays there.
        for start in [0usize, 1, 5, 8] {
            let mut active = start;
            for _ in 0..16 {
                match admission_action(active, 2.0, 8) {
                    AdmissionAction::Start => active += 1,
                    AdmissionAction::Stop => active -= 1,
                    AdmissionAction::Hold { .. } => {}
                }
            }
            assert_eq!(active, 2, "failed to converge from {start}");
        }
    }

    #[test]
    fn throttle_delay_is_proportional_to_the_tick() {
        let tick = Duration::from_millis(250);
        assert_eq!(throttle_delay(tick, 0.5), Duration::from_millis(125));
        assert_eq!(throttle_delay(tick, 0.0), Duration::ZERO);
        assert_eq!(throttle_delay(tick, 2.0), tick);
    }

    #[test]
    fn fixed_budget_sanitizes_its_target() {
        assert_eq!(FixedBudget::new(2.5).target_workers(), 2.5);
        assert_eq!(FixedBudget::new(-1.0).target_workers(), 0.0);
        assert_eq!(FixedBudget::new(f64::NAN).target_workers(), 0.0);
        assert_eq!(FixedBudget::new(f64::INFINITY).target_workers(), f64::INFINITY);
    }
}
