//! Standard rule-element library
//!
//! These are the elements a stock weight set can reference out of the box.
//! Each registers a stable id; weight sets that never mention an id simply
//! leave that element inactive.

mod batch_fill;
mod critical_ratio;
mod due_date;
mod early_window;
mod processing_time;
mod queue_pressure;
mod release_slack;

pub use batch_fill::BatchFill;
pub use critical_ratio::CriticalRatio;
pub use due_date::EarliestDueDate;
pub use early_window::{EarlyWindowConfig, EarlyWindowFactor};
pub use processing_time::ShortestProcessingTime;
pub use queue_pressure::QueuePressure;
pub use release_slack::ReleaseSlack;
