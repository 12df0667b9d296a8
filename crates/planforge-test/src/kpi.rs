//! Scripted KPI stubs

use std::collections::VecDeque;
use std::sync::Mutex;

use planforge_core::{KpiCalculator, KpiDirection, Result, Scenario, ScheduleState};

/// KPI calculator replaying a scripted sequence of values, one per
/// `compute` call, then repeating the final value. Lets optimizer tests
/// force (or forbid) strict improvements deterministically.
pub struct ScriptedKpi {
    name: String,
    direction: KpiDirection,
    values: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedKpi {
    pub fn new(
        name: impl Into<String>,
        direction: KpiDirection,
        values: impl IntoIterator<Item = f64>,
    ) -> Self {
        let values: VecDeque<f64> = values.into_iter().collect();
        let fallback = values.back().copied().unwrap_or(direction.worst_value());
        Self {
            name: name.into(),
            direction,
            values: Mutex::new(values),
            fallback,
        }
    }
}

impl KpiCalculator for ScriptedKpi {
    fn name(&self) -> &str {
        &self.name
    }

    fn direction(&self) -> KpiDirection {
        self.direction
    }

    fn compute(&self, _scenario: &Scenario, _schedule: &ScheduleState) -> Result<f64> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.pop_front().unwrap_or(self.fallback))
    }
}
