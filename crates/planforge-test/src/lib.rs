//! Shared test fixtures for PlanForge crates.
//!
//! - [`scenarios`] - ready-made scenarios (precedence chain, job shop,
//!   batching) used across the simulation and optimizer test suites
//! - [`elements`] - instrumented rule elements (call counting, constant
//!   score) for scoring-contract tests
//! - [`kpi`] - scripted KPI stubs for optimizer tests
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! planforge-test = { workspace = true }
//! ```

pub mod elements;
pub mod kpi;
pub mod scenarios;

pub use elements::{ConstElement, CountingElement};
pub use kpi::ScriptedKpi;
pub use scenarios::{batching_scenario, chain_scenario, default_weights, job_shop_scenario};
