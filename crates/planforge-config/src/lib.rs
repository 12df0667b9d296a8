//! Configuration system for PlanForge.
//!
//! Load simulation and RuleSeek settings from TOML or YAML files to control
//! runs without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use planforge_config::{PerturbMode, PlanForgeConfig};
//! use std::time::Duration;
//!
//! let config = PlanForgeConfig::from_toml_str(r#"
//!     [sim]
//!     progress_step_percent = 5
//!
//!     [seek]
//!     kpi = "total_tardiness"
//!     top_k = 5
//!     seed = 42
//!     perturb_mode = "all"
//!     delivery_interval_ms = 250
//! "#).unwrap();
//!
//! assert_eq!(config.sim.progress_step_percent, 5);
//! assert_eq!(config.seek.kpi, "total_tardiness");
//! assert_eq!(config.seek.perturb_mode, PerturbMode::All);
//! assert_eq!(config.seek.delivery_interval(), Duration::from_millis(250));
//! ```
//!
//! Use defaults when the file is missing:
//!
//! ```
//! use planforge_config::PlanForgeConfig;
//!
//! let config = PlanForgeConfig::load("planforge.toml").unwrap_or_default();
//! assert_eq!(config.seek.top_k, 10);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration: one section per subsystem.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PlanForgeConfig {
    /// Simulation run settings.
    #[serde(default)]
    pub sim: SimConfig,

    /// RuleSeek optimizer settings.
    #[serde(default)]
    pub seek: SeekConfig,
}

impl PlanForgeConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Checks both sections for out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sim.validate()?;
        self.seek.validate()
    }
}

/// Simulation run settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimConfig {
    /// Minimum percent gap between `Scheduling` progress events.
    #[serde(default = "default_progress_step")]
    pub progress_step_percent: u8,

    /// Render the per-resource block report at the end of each run.
    #[serde(default)]
    pub log_block_report: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            progress_step_percent: default_progress_step(),
            log_block_report: false,
        }
    }
}

impl SimConfig {
    /// Sets the progress sampling step.
    pub fn with_progress_step(mut self, percent: u8) -> Self {
        self.progress_step_percent = percent;
        self
    }

    /// Enables the end-of-run block report.
    pub fn with_block_report(mut self) -> Self {
        self.log_block_report = true;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.progress_step_percent) {
            return Err(ConfigError::Invalid(format!(
                "progress_step_percent must be in 1..=100, got {}",
                self.progress_step_percent
            )));
        }
        Ok(())
    }
}

/// Which weights a RuleSeek perturbation may touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbMode {
    /// Only weights already carrying non-zero points.
    #[default]
    InUseOnly,

    /// Every weight in the set, activating unused rules.
    All,
}

/// RuleSeek optimizer settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SeekConfig {
    /// KPI the search optimizes, resolved by name against the registry.
    #[serde(default = "default_kpi")]
    pub kpi: String,

    /// How many best scores the session retains.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Session seed for reproducible searches. `None` draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Which weights a perturbation may touch.
    #[serde(default)]
    pub perturb_mode: PerturbMode,

    /// Largest absolute change one perturbation applies to a weight's points.
    #[serde(default = "default_max_point_step")]
    pub max_point_step: i32,

    /// Worker-count target handed to the fixed CPU budget when no custom
    /// budget is supplied. Fractional values throttle one worker.
    #[serde(default = "default_target_workers")]
    pub target_workers: f64,

    /// Hard cap on simultaneously running workers.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Period of the admission-control loop.
    #[serde(default = "default_admission_tick_ms")]
    pub admission_tick_ms: u64,

    /// Flush period for batched discovery delivery.
    #[serde(default = "default_delivery_interval_ms")]
    pub delivery_interval_ms: u64,

    /// Stop each worker after this many iterations. `None` runs until the
    /// session is stopped.
    #[serde(default)]
    pub iteration_limit: Option<u64>,
}

impl Default for SeekConfig {
    fn default() -> Self {
        Self {
            kpi: default_kpi(),
            top_k: default_top_k(),
            seed: None,
            perturb_mode: PerturbMode::default(),
            max_point_step: default_max_point_step(),
            target_workers: default_target_workers(),
            max_workers: default_max_workers(),
            admission_tick_ms: default_admission_tick_ms(),
            delivery_interval_ms: default_delivery_interval_ms(),
            iteration_limit: None,
        }
    }
}

impl SeekConfig {
    /// Sets the KPI to optimize.
    pub fn with_kpi(mut self, kpi: impl Into<String>) -> Self {
        self.kpi = kpi.into();
        self
    }

    /// Sets how many best scores to retain.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Sets the session seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the perturbation mode.
    pub fn with_perturb_mode(mut self, mode: PerturbMode) -> Self {
        self.perturb_mode = mode;
        self
    }

    /// Sets the largest per-weight point change.
    pub fn with_max_point_step(mut self, step: i32) -> Self {
        self.max_point_step = step;
        self
    }

    /// Sets the fixed worker-count target.
    pub fn with_target_workers(mut self, target: f64) -> Self {
        self.target_workers = target;
        self
    }

    /// Sets the worker cap.
    pub fn with_max_workers(mut self, max: usize) -> Self {
        self.max_workers = max;
        self
    }

    /// Sets the admission tick period in milliseconds.
    pub fn with_admission_tick_ms(mut self, millis: u64) -> Self {
        self.admission_tick_ms = millis;
        self
    }

    /// Sets the discovery flush period in milliseconds.
    pub fn with_delivery_interval_ms(mut self, millis: u64) -> Self {
        self.delivery_interval_ms = millis;
        self
    }

    /// Caps iterations per worker.
    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// The admission-control period as a `Duration`.
    pub fn admission_tick(&self) -> Duration {
        Duration::from_millis(self.admission_tick_ms)
    }

    /// The discovery flush period as a `Duration`.
    pub fn delivery_interval(&self) -> Duration {
        Duration::from_millis(self.delivery_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kpi.is_empty() {
            return Err(ConfigError::Invalid("kpi must not be empty".into()));
        }
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be at least 1".into()));
        }
        if self.max_point_step < 1 {
            return Err(ConfigError::Invalid(format!(
                "max_point_step must be at least 1, got {}",
                self.max_point_step
            )));
        }
        if !self.target_workers.is_finite() || self.target_workers < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "target_workers must be finite and non-negative, got {}",
                self.target_workers
            )));
        }
        if self.max_workers == 0 {
            return Err(ConfigError::Invalid("max_workers must be at least 1".into()));
        }
        if self.admission_tick_ms == 0 || self.delivery_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "admission_tick_ms and delivery_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn default_progress_step() -> u8 {
    10
}

fn default_kpi() -> String {
    "makespan".to_owned()
}

fn default_top_k() -> usize {
    10
}

fn default_max_point_step() -> i32 {
    10
}

fn default_target_workers() -> f64 {
    2.0
}

fn default_max_workers() -> usize {
    8
}

fn default_admission_tick_ms() -> u64 {
    250
}

fn default_delivery_interval_ms() -> u64 {
    500
}
