//! KPI contracts and the standard KPI library
//!
//! A KPI is a named scalar computed over a completed schedule, with a
//! declared better-direction. RuleSeek resolves the target KPI by name
//! through a [`KpiRegistry`] before any worker starts.

use std::sync::Arc;

use crate::error::{DomainError, Result};
use crate::scenario::Scenario;
use crate::schedule::ScheduleState;
use crate::time::span_hours;

/// Which way a KPI improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KpiDirection {
    LowerIsBetter,
    HigherIsBetter,
}

impl KpiDirection {
    /// Whether `candidate` strictly improves on `incumbent`.
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            KpiDirection::LowerIsBetter => candidate < incumbent,
            KpiDirection::HigherIsBetter => candidate > incumbent,
        }
    }

    /// The value no real KPI can fail to improve on.
    pub fn worst_value(self) -> f64 {
        match self {
            KpiDirection::LowerIsBetter => f64::INFINITY,
            KpiDirection::HigherIsBetter => f64::NEG_INFINITY,
        }
    }
}

/// Computes one named KPI over a completed schedule.
pub trait KpiCalculator: Send + Sync {
    /// Registry name, matched case-sensitively.
    fn name(&self) -> &str;

    fn direction(&self) -> KpiDirection;

    fn compute(&self, scenario: &Scenario, schedule: &ScheduleState) -> Result<f64>;

    /// Engineer-facing display text for a computed value.
    fn format(&self, value: f64) -> String {
        format!("{value:.2}")
    }
}

/// Hours from the scenario clock to the last scheduled end.
#[derive(Debug, Default)]
pub struct Makespan;

impl KpiCalculator for Makespan {
    fn name(&self) -> &str {
        "makespan"
    }

    fn direction(&self) -> KpiDirection {
        KpiDirection::LowerIsBetter
    }

    fn compute(&self, scenario: &Scenario, schedule: &ScheduleState) -> Result<f64> {
        Ok(schedule
            .makespan_end()
            .map(|end| span_hours(end - scenario.clock))
            .unwrap_or(0.0))
    }

    fn format(&self, value: f64) -> String {
        format!("{value:.1} h")
    }
}

/// Sum of hours each due-dated job finishes past its due date.
#[derive(Debug, Default)]
pub struct TotalTardiness;

impl KpiCalculator for TotalTardiness {
    fn name(&self) -> &str {
        "total_tardiness"
    }

    fn direction(&self) -> KpiDirection {
        KpiDirection::LowerIsBetter
    }

    fn compute(&self, scenario: &Scenario, schedule: &ScheduleState) -> Result<f64> {
        let mut total = 0.0;
        for (job_index, job) in scenario.jobs.iter().enumerate() {
            let (Some(due), Some(done)) = (job.due_date, schedule.job_completion(job_index)) else {
                continue;
            };
            if done > due {
                total += span_hours(done - due);
            }
        }
        Ok(total)
    }

    fn format(&self, value: f64) -> String {
        format!("{value:.1} h late")
    }
}

/// Fraction of due-dated jobs completing at or before their due date.
#[derive(Debug, Default)]
pub struct OnTimeRate;

impl KpiCalculator for OnTimeRate {
    fn name(&self) -> &str {
        "on_time_rate"
    }

    fn direction(&self) -> KpiDirection {
        KpiDirection::HigherIsBetter
    }

    fn compute(&self, scenario: &Scenario, schedule: &ScheduleState) -> Result<f64> {
        let mut with_due = 0u32;
        let mut on_time = 0u32;
        for (job_index, job) in scenario.jobs.iter().enumerate() {
            let Some(due) = job.due_date else { continue };
            with_due += 1;
            match schedule.job_completion(job_index) {
                Some(done) if done <= due => on_time += 1,
                _ => {}
            }
        }
        if with_due == 0 {
            return Ok(1.0);
        }
        Ok(f64::from(on_time) / f64::from(with_due))
    }

    fn format(&self, value: f64) -> String {
        format!("{:.1}%", value * 100.0)
    }
}

/// Name-indexed set of KPI calculators.
#[derive(Clone, Default)]
pub struct KpiRegistry {
    calculators: Vec<Arc<dyn KpiCalculator>>,
}

impl KpiRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard KPI library.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Makespan));
        registry.register(Arc::new(TotalTardiness));
        registry.register(Arc::new(OnTimeRate));
        registry
    }

    /// Registers a calculator; a later registration shadows an earlier one
    /// with the same name.
    pub fn register(&mut self, calculator: Arc<dyn KpiCalculator>) {
        self.calculators
            .retain(|existing| existing.name() != calculator.name());
        self.calculators.push(calculator);
    }

    /// Resolves a KPI by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn KpiCalculator>> {
        self.calculators
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .ok_or_else(|| DomainError::UnknownKpi(name.to_string()))
    }
}
