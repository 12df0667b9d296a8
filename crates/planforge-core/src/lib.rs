//! PlanForge Core - Domain model and contracts for the scheduling engine
//!
//! This crate provides the shared vocabulary of the PlanForge workspace:
//! - Scenario definitions: jobs, operations, resources, rule-weight sets
//! - Runtime scheduling artifacts: activities, batches, resource blocks
//! - Schedule state produced by a simulation run
//! - KPI contracts and the standard KPI library
//! - Snapshot and cancellation contracts used by the RuleSeek optimizer

pub mod activity;
pub mod cancel;
pub mod error;
pub mod job;
pub mod kpi;
pub mod resource;
pub mod scenario;
pub mod schedule;
pub mod snapshot;
pub mod time;
pub mod weights;

pub use activity::{Activity, ActivityId, Batch, BatchId, ResourceBlock};
pub use cancel::CancelToken;
pub use error::{DomainError, Result};
pub use job::{Job, Operation};
pub use kpi::{KpiCalculator, KpiDirection, KpiRegistry, Makespan, OnTimeRate, TotalTardiness};
pub use resource::{Capacity, Resource};
pub use scenario::{Scenario, ScenarioSettings};
pub use schedule::ScheduleState;
pub use snapshot::{CloneSnapshot, SnapshotService};
pub use time::SimTime;
pub use weights::{RuleWeight, RuleWeightSet, NO_SCALING};
