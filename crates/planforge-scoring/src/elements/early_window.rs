//! Early-release-window sequencing factor

use std::collections::BTreeMap;

use planforge_core::time::{hours, span_hours, SimTime};
use planforge_core::RuleWeight;

use crate::context::ScoreContext;
use crate::curve::{declining_penalty, DecayShape};
use crate::element::{Capabilities, RuleElement};
use crate::error::{Result, ScoringError};

/// Settings for [`EarlyWindowFactor`], parsed from the free-form weight
/// settings map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarlyWindowConfig {
    /// Length of the early window, starting at the operation's release.
    pub window_span: SimTime,
    /// Penalty at the window start.
    pub max_penalty: f64,
    /// Penalty at the window end.
    pub min_penalty: f64,
    pub decay: DecayShape,
}

impl Default for EarlyWindowConfig {
    fn default() -> Self {
        Self {
            window_span: hours(24),
            max_penalty: 10.0,
            min_penalty: 0.0,
            decay: DecayShape::Linear,
        }
    }
}

impl EarlyWindowConfig {
    /// Parses the recognised keys from a weight's settings map. Keys other
    /// elements own are ignored; malformed values for recognised keys are
    /// errors.
    pub fn from_settings(settings: &BTreeMap<String, String>) -> Result<Self> {
        let mut config = Self::default();
        for (key, value) in settings {
            let invalid = || ScoringError::InvalidSetting {
                element: "early_window".to_string(),
                key: key.clone(),
                value: value.clone(),
            };
            match key.as_str() {
                "early_window_span" => {
                    config.window_span = value.parse().map_err(|_| invalid())?;
                }
                "max_penalty" => {
                    config.max_penalty = value.parse().map_err(|_| invalid())?;
                }
                "min_penalty" => {
                    config.min_penalty = value.parse().map_err(|_| invalid())?;
                }
                "decay" => {
                    config.decay = DecayShape::parse(value).ok_or_else(invalid)?;
                }
                _ => {}
            }
        }
        Ok(config)
    }
}

/// Sequencing factor tied to an operation's early-release window.
///
/// The base score is released-hours urgency. While the clock sits inside
/// `[release, release + window_span]` a declining penalty is subtracted,
/// starting at `max_penalty` and reaching `min_penalty` at the window end;
/// outside the window the base score passes through unmodified.
#[derive(Debug, Default)]
pub struct EarlyWindowFactor {
    default_config: EarlyWindowConfig,
}

impl EarlyWindowFactor {
    /// Factor with an explicit default configuration, used when a weight
    /// carries no settings of its own.
    pub fn new(default_config: EarlyWindowConfig) -> Self {
        Self { default_config }
    }
}

impl RuleElement for EarlyWindowFactor {
    fn id(&self) -> &str {
        "early_window"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::weighted().and_configurable().and_early_window()
    }

    fn score(&self, ctx: &ScoreContext<'_>, weight: &RuleWeight) -> f64 {
        let config = if weight.settings.is_empty() {
            self.default_config
        } else {
            EarlyWindowConfig::from_settings(&weight.settings).unwrap_or(self.default_config)
        };
        let release = ctx.operation().release.unwrap_or(ctx.scenario.clock);
        let base = span_hours(ctx.clock - release);
        let window_end = release + config.window_span;
        if config.window_span <= 0 || ctx.clock < release || ctx.clock > window_end {
            return base;
        }
        let progress = (ctx.clock - release) as f64 / config.window_span as f64;
        base - declining_penalty(config.decay, config.max_penalty, config.min_penalty, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::{ActivityId, Job, Operation, Resource, Scenario, ScheduleState};

    fn fixture(release: SimTime) -> (Scenario, ScheduleState) {
        let scenario = Scenario::new("s")
            .with_resource(Resource::new("mill", "default"))
            .with_job(
                Job::new("j")
                    .with_operation(Operation::new("cut", hours(1)).with_release(release)),
            );
        let mut schedule = ScheduleState::new();
        schedule.push_activity(0, 0, 1.0);
        (scenario, schedule)
    }

    fn score_at(clock: SimTime, weight: &RuleWeight) -> f64 {
        let (scenario, schedule) = fixture(hours(10));
        let ctx = ScoreContext {
            scenario: &scenario,
            schedule: &schedule,
            activity: schedule.activity(ActivityId(0)),
            resource_index: 0,
            clock,
            earliest_start: clock.max(hours(10)),
            resource_multiplier: 1.0,
        };
        EarlyWindowFactor::default().score(&ctx, weight)
    }

    #[test]
    fn before_the_window_passes_through() {
        let w = RuleWeight::with_points(1);
        // Base score at h8 with release h10 is -2.0, no penalty applied.
        assert_eq!(score_at(hours(8), &w), -2.0);
    }

    #[test]
    fn window_start_takes_the_full_penalty() {
        let w = RuleWeight::with_points(1);
        assert_eq!(score_at(hours(10), &w), -10.0);
    }

    #[test]
    fn penalty_fades_across_the_window() {
        let w = RuleWeight::with_points(1);
        // Default window is 24 h; halfway through, the linear penalty is 5.
        let halfway = score_at(hours(22), &w);
        assert_eq!(halfway, 12.0 - 5.0);
        // Past the window end the base score is unmodified again.
        assert_eq!(score_at(hours(35), &w), 25.0);
    }

    #[test]
    fn settings_override_the_default_config() {
        let w = RuleWeight::with_points(1)
            .with_setting("early_window_span", hours(4).to_string())
            .with_setting("max_penalty", "6")
            .with_setting("min_penalty", "2")
            .with_setting("decay", "linear");
        // Halfway through the 4 h window: base 2.0, penalty (6+2)/2.
        assert_eq!(score_at(hours(12), &w), 2.0 - 4.0);
    }

    #[test]
    fn malformed_settings_are_rejected_by_the_parser() {
        let mut settings = BTreeMap::new();
        settings.insert("max_penalty".to_string(), "plenty".to_string());
        assert!(matches!(
            EarlyWindowConfig::from_settings(&settings),
            Err(ScoringError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut settings = BTreeMap::new();
        settings.insert("someone_elses_knob".to_string(), "7".to_string());
        assert_eq!(
            EarlyWindowConfig::from_settings(&settings).unwrap(),
            EarlyWindowConfig::default()
        );
    }
}
