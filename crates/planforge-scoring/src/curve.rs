//! Early-window penalty decay curves

/// Shape of the penalty decline across the early window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecayShape {
    #[default]
    Linear,
    Exponential,
    Logarithmic,
}

impl DecayShape {
    /// Parses the setting strings rule-weight sets carry.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "linear" => Some(DecayShape::Linear),
            "exponential" => Some(DecayShape::Exponential),
            "logarithmic" => Some(DecayShape::Logarithmic),
            _ => None,
        }
    }
}

/// Penalty at `progress` through the window, declining monotonically from
/// `max_penalty` at 0.0 to `min_penalty` at 1.0. `progress` outside [0, 1]
/// is clamped.
pub fn declining_penalty(shape: DecayShape, max_penalty: f64, min_penalty: f64, progress: f64) -> f64 {
    let t = progress.clamp(0.0, 1.0);
    let range = max_penalty - min_penalty;
    if range <= 0.0 {
        return max_penalty;
    }
    match shape {
        DecayShape::Linear => max_penalty - range * t,
        // Halves the remaining range every ~0.23 of the window; reaches the
        // minimum exactly at the window end.
        DecayShape::Exponential => {
            let decayed = (-3.0 * t).exp();
            let floor = (-3.0f64).exp();
            min_penalty + range * (decayed - floor) / (1.0 - floor)
        }
        // Fast initial drop that flattens toward the window end.
        DecayShape::Logarithmic => {
            let drop = (1.0 + 9.0 * t).ln() / 10.0f64.ln();
            max_penalty - range * drop
        }
    }
}
