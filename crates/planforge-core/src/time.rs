//! Simulation time scale
//!
//! All scheduling arithmetic runs on plain `i64` milliseconds measured from
//! the scenario epoch. Calendar/timezone conversion happens outside the core.

/// Milliseconds since the scenario epoch.
pub type SimTime = i64;

/// One second in [`SimTime`] units.
pub const SECOND: SimTime = 1_000;

/// One minute in [`SimTime`] units.
pub const MINUTE: SimTime = 60 * SECOND;

/// One hour in [`SimTime`] units.
pub const HOUR: SimTime = 60 * MINUTE;

/// One day in [`SimTime`] units.
pub const DAY: SimTime = 24 * HOUR;

/// Converts whole minutes to [`SimTime`].
pub const fn minutes(n: i64) -> SimTime {
    n * MINUTE
}

/// Converts whole hours to [`SimTime`].
pub const fn hours(n: i64) -> SimTime {
    n * HOUR
}

/// Converts a [`SimTime`] span to fractional hours, for score arithmetic.
pub fn span_hours(span: SimTime) -> f64 {
    span as f64 / HOUR as f64
}
