//! PlanForge - A Production Scheduling Engine in Rust
//!
//! Scenario in, schedule out: describe resources, jobs, and rule-weight
//! sets, run the deterministic dispatch simulation, and let RuleSeek search
//! for weightings that improve a chosen KPI while the session stays
//! interactive.
//!
//! # Example
//!
//! ```rust
//! use planforge::prelude::*;
//!
//! let scenario = Scenario::new("demo")
//!     .with_resource(Resource::new("mill", "default"))
//!     .with_weight_set(
//!         RuleWeightSet::new("default").with_weight("due_date", RuleWeight::with_points(40)),
//!     )
//!     .with_job(
//!         Job::new("order").with_operation(Operation::new("cut", hours(1)).with_resource("mill")),
//!     );
//!
//! let outcome = planforge::simulate(&scenario);
//! assert!(outcome.is_complete());
//! assert_eq!(outcome.report.scheduled, 1);
//! ```

// Domain model and shared contracts
pub use planforge_core::time::{hours, minutes, span_hours, DAY, HOUR, MINUTE, SECOND};
pub use planforge_core::{
    Activity, ActivityId, Batch, BatchId, CancelToken, Capacity, CloneSnapshot, DomainError, Job,
    KpiCalculator, KpiDirection, KpiRegistry, Operation, Resource, ResourceBlock, RuleWeight,
    RuleWeightSet, Scenario, ScenarioSettings, ScheduleState, SimTime, SnapshotService, NO_SCALING,
};

// Dispatch-rule scoring
pub use planforge_scoring::{
    Capabilities, CompositeScorer, DecayShape, ElementRegistry, RuleElement, ScoreContext,
};

// Simulation engine and consistency checker
pub use planforge_sim::{
    check_schedule, render_block_report, validate_scenario, CheckReport, SimError, Simulation,
    SimulationOutcome, SimulationReport, SimulationStatus, ValidationError,
};

// RuleSeek optimizer
pub use planforge_seek::{
    CpuBudget, Discovery, FixedBudget, RuleSeekScore, RuleSeekSession, SeekDiagnostics, SeekError,
};

// Configuration
pub use planforge_config::{ConfigError, PerturbMode, PlanForgeConfig, SeekConfig, SimConfig};

#[cfg(feature = "console")]
pub mod console;

mod simulate;
pub use simulate::{simulate, simulate_with};

pub mod prelude {
    pub use super::{hours, minutes, DAY, HOUR, MINUTE};
    pub use super::{simulate, simulate_with};
    pub use super::{
        Capacity, Job, KpiRegistry, Operation, Resource, RuleSeekSession, RuleWeight,
        RuleWeightSet, Scenario, ScenarioSettings, SimTime, Simulation,
    };
}
