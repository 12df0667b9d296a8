//! Error types for the simulation core

use thiserror::Error;

use crate::validate::ValidationError;

/// Main error type for simulation runs
#[derive(Debug, Error)]
pub enum SimError {
    /// Pre-start validation rejected the scenario; the run never began
    #[error("Scenario validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    /// Unhandled fault mid-loop; the partial schedule is retained
    #[error("Scheduling fault: {0}")]
    Fault(String),

    /// Domain-model failure surfaced through the run
    #[error(transparent)]
    Domain(#[from] planforge_core::DomainError),
}

/// Result type alias for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
