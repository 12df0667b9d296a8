//! Error types for the RuleSeek optimizer

use thiserror::Error;

use planforge_config::ConfigError;
use planforge_core::DomainError;

/// Main error type for RuleSeek sessions
#[derive(Debug, Error)]
pub enum SeekError {
    /// KPI resolution, snapshot, or another domain-model failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The seek configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `start` was called while a previous run is still live
    #[error("RuleSeek session is already running")]
    AlreadyRunning,
}

/// Result type alias for RuleSeek operations
pub type Result<T> = std::result::Result<T, SeekError>;
