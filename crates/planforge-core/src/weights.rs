//! Dispatch-rule weight sets
//!
//! A [`RuleWeightSet`] maps rule-element ids to the tuning knobs the scoring
//! engine reads: integer points, a per-resource multiplier, an optional
//! minimum-score gate, and an optional category multiplier. Weight sets are
//! cloned, never shared, whenever the RuleSeek optimizer perturbs them.

use std::collections::BTreeMap;

/// Sentinel for [`RuleWeight::category_multiplier`] meaning "no scaling".
pub const NO_SCALING: f64 = -1.0;

/// Tuning knobs for one rule element within a weight set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleWeight {
    /// Base points. Zero points deactivates the element entirely.
    pub points: i32,
    /// Multiplier applied to alternate-resource comparisons.
    pub resource_multiplier: f64,
    /// Whether scores below [`RuleWeight::minimum_score`] are gated.
    pub use_minimum_score: bool,
    /// Gate threshold, only meaningful when `use_minimum_score` is set.
    pub minimum_score: f64,
    /// Category multiplier; [`NO_SCALING`] leaves the points untouched.
    pub category_multiplier: f64,
    /// Free-form element settings, interpreted by the element itself.
    pub settings: BTreeMap<String, String>,
}

impl Default for RuleWeight {
    fn default() -> Self {
        Self {
            points: 0,
            resource_multiplier: 1.0,
            use_minimum_score: false,
            minimum_score: 0.0,
            category_multiplier: NO_SCALING,
            settings: BTreeMap::new(),
        }
    }
}

impl RuleWeight {
    /// Creates a weight with the given base points and defaults elsewhere.
    pub fn with_points(points: i32) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Sets the alternate-resource multiplier.
    pub fn with_resource_multiplier(mut self, multiplier: f64) -> Self {
        self.resource_multiplier = multiplier;
        self
    }

    /// Enables the minimum-score gate at the given threshold.
    pub fn with_minimum_score(mut self, threshold: f64) -> Self {
        self.use_minimum_score = true;
        self.minimum_score = threshold;
        self
    }

    /// Sets the category multiplier.
    pub fn with_category_multiplier(mut self, multiplier: f64) -> Self {
        self.category_multiplier = multiplier;
        self
    }

    /// Adds a free-form setting entry.
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Points after category scaling. This is the activation test input:
    /// an element whose effective points are zero is never invoked.
    pub fn effective_points(&self) -> f64 {
        if self.category_multiplier == NO_SCALING {
            f64::from(self.points)
        } else {
            f64::from(self.points) * self.category_multiplier
        }
    }

    /// Whether the element this weight belongs to participates in scoring.
    pub fn is_active(&self) -> bool {
        self.effective_points() != 0.0
    }
}

/// Named mapping from rule-element id to [`RuleWeight`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleWeightSet {
    /// Identifier resources use to select this set.
    pub id: String,
    weights: BTreeMap<String, RuleWeight>,
}

impl RuleWeightSet {
    /// Creates an empty weight set with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            weights: BTreeMap::new(),
        }
    }

    /// Adds or replaces the weight for one rule element.
    pub fn with_weight(mut self, element_id: impl Into<String>, weight: RuleWeight) -> Self {
        self.weights.insert(element_id.into(), weight);
        self
    }

    /// Adds or replaces the weight for one rule element, in place.
    pub fn set_weight(&mut self, element_id: impl Into<String>, weight: RuleWeight) {
        self.weights.insert(element_id.into(), weight);
    }

    /// Looks up the weight for a rule element.
    pub fn weight(&self, element_id: &str) -> Option<&RuleWeight> {
        self.weights.get(element_id)
    }

    /// Iterates (element id, weight) pairs in deterministic id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleWeight)> {
        self.weights.iter().map(|(id, w)| (id.as_str(), w))
    }

    /// Iterates weights mutably, for perturbation.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut RuleWeight)> {
        self.weights.iter_mut().map(|(id, w)| (id.as_str(), w))
    }

    /// Number of weights carried by this set.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether this set carries no weights at all.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
