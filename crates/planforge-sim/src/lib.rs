//! PlanForge Simulation Engine
//!
//! This crate provides the scheduling simulation including:
//! - Scenario validation and the terminal run statuses
//! - The deterministic candidate queue
//! - The discrete-event dispatch loop with batching and splitting
//! - Progress sampling and sinks
//! - The schedule consistency checker

pub mod checker;
pub mod error;
pub mod progress;
pub mod queue;
pub mod simulation;
pub mod validate;

pub use checker::{check_schedule, render_block_report, CheckReport, Violation, ViolationKind};
pub use error::{Result, SimError};
pub use progress::{
    MemorySink, NullSink, ProgressEvent, ProgressSampler, ProgressSink, SimulationStatus,
};
pub use queue::{CandidateKey, CandidateQueue};
pub use simulation::{Simulation, SimulationOutcome, SimulationReport};
pub use validate::{validate_scenario, ValidationError, ValidationErrorKind};
