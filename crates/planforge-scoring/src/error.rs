//! Error types for the scoring engine

use thiserror::Error;

/// Errors raised while configuring rule elements.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// A free-form weight setting could not be parsed by its element
    #[error("Invalid setting {key}={value:?} for rule element {element}")]
    InvalidSetting {
        element: String,
        key: String,
        value: String,
    },
}

/// Result type alias for scoring operations
pub type Result<T> = std::result::Result<T, ScoringError>;
