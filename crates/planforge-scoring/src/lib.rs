//! PlanForge Scoring - Weighted dispatch-rule scoring engine
//!
//! This crate decides where work goes: it composes many pluggable weighted
//! rule elements into a single score per (activity, resource) candidate.
//!
//! - [`RuleElement`] with a flat [`Capabilities`] set, queried at
//!   composition time
//! - [`CompositeScorer`]: sum of `element_score x effective_points` over
//!   active elements, clamped to [`SCORE_BOUND`]
//! - A standard element library covering the common dispatch heuristics
//! - Early-window penalty curves with selectable decay shapes

pub mod composite;
pub mod context;
pub mod curve;
pub mod element;
pub mod elements;
pub mod error;
pub mod registry;

pub use composite::{clamp_score, CompositeScorer, SCORE_BOUND};
pub use context::ScoreContext;
pub use curve::{declining_penalty, DecayShape};
pub use element::{Capabilities, MinScorePolicy, RuleElement};
pub use elements::{
    BatchFill, CriticalRatio, EarliestDueDate, EarlyWindowConfig, EarlyWindowFactor,
    QueuePressure, ReleaseSlack, ShortestProcessingTime,
};
pub use error::{Result, ScoringError};
pub use registry::ElementRegistry;
