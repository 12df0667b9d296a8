//! Simulation entry point that hides the engine wiring.

use tracing::info;

use planforge_config::PlanForgeConfig;
use planforge_core::Scenario;
use planforge_sim::{render_block_report, Simulation, SimulationOutcome};

/// Runs one scheduling pass with settings from `planforge.toml` in the
/// working directory, falling back to defaults when the file is absent.
pub fn simulate(scenario: &Scenario) -> SimulationOutcome {
    let config = PlanForgeConfig::load("planforge.toml").unwrap_or_default();
    simulate_with(scenario, &config)
}

/// Runs one scheduling pass with explicit settings.
pub fn simulate_with(scenario: &Scenario, config: &PlanForgeConfig) -> SimulationOutcome {
    let outcome = Simulation::standard()
        .with_progress_step(config.sim.progress_step_percent)
        .run(scenario);
    if config.sim.log_block_report {
        info!(
            event = "block_report",
            report = %render_block_report(scenario, &outcome.schedule)
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_test::chain_scenario;

    #[test]
    fn simulate_runs_with_default_settings() {
        let outcome = simulate(&chain_scenario());
        assert!(outcome.is_complete());
        assert_eq!(outcome.report.scheduled, 3);
    }

    #[test]
    fn simulate_with_honors_the_config() {
        let config = PlanForgeConfig::default();
        let outcome = simulate_with(&chain_scenario(), &config);
        assert_eq!(outcome.report.blocks_committed, 3);
    }
}
