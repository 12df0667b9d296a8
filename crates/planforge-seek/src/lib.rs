//! PlanForge RuleSeek Optimizer
//!
//! This crate provides the concurrent rule-weight search including:
//! - The session lifecycle with synchronous up-front validation
//! - Worker pools sized by a CPU budget on a fixed admission tick
//! - Seeded weight perturbation with sign-matched bounded draws
//! - The shared Top-K score set and batched discovery delivery
//! - Run diagnostics that survive pool resizing

pub mod budget;
pub mod delivery;
pub mod diagnostics;
pub mod error;
pub mod perturb;
pub mod score;
pub mod session;

mod worker;

pub use budget::{admission_action, throttle_delay, AdmissionAction, CpuBudget, FixedBudget};
pub use delivery::{DeliveryQueue, Discovery};
pub use diagnostics::{DiagnosticsCollector, SeekDiagnostics};
pub use error::{Result, SeekError};
pub use perturb::perturb_weight_sets;
pub use score::{Acceptance, RuleSeekScore, TopScores};
pub use session::RuleSeekSession;
