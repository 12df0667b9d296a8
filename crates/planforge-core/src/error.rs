//! Error types for the PlanForge domain model

use thiserror::Error;

/// Main error type for domain-model operations
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced resource id does not exist in the scenario
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// A referenced rule-weight set id does not exist in the scenario
    #[error("Unknown rule-weight set: {0}")]
    UnknownWeightSet(String),

    /// A referenced KPI name is not registered
    #[error("Unknown KPI: {0}")]
    UnknownKpi(String),

    /// Error in scenario or job definition
    #[error("Scenario definition error: {0}")]
    Definition(String),

    /// Failure while producing a scenario snapshot
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Failure while computing a KPI over a schedule
    #[error("KPI calculation error: {0}")]
    KpiCalculation(String),
}

/// Result type alias for domain-model operations
pub type Result<T> = std::result::Result<T, DomainError>;
