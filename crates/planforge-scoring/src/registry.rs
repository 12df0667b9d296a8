//! Element registry
//!
//! Registration order is scoring order, which makes composite scores
//! reproducible across runs. Replacing an element keeps its position.

use std::sync::Arc;

use crate::element::RuleElement;
use crate::elements::{
    BatchFill, CriticalRatio, EarliestDueDate, EarlyWindowFactor, QueuePressure, ReleaseSlack,
    ShortestProcessingTime,
};

/// Ordered collection of the rule elements available to a scoring pass.
#[derive(Clone, Default)]
pub struct ElementRegistry {
    elements: Vec<Arc<dyn RuleElement>>,
}

impl ElementRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard element library.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EarliestDueDate));
        registry.register(Arc::new(CriticalRatio));
        registry.register(Arc::new(ShortestProcessingTime));
        registry.register(Arc::new(ReleaseSlack));
        registry.register(Arc::new(BatchFill));
        registry.register(Arc::new(QueuePressure));
        registry.register(Arc::new(EarlyWindowFactor::default()));
        registry
    }

    /// Adds an element; re-registering an id replaces it in place.
    pub fn register(&mut self, element: Arc<dyn RuleElement>) {
        match self.elements.iter().position(|e| e.id() == element.id()) {
            Some(pos) => self.elements[pos] = element,
            None => self.elements.push(element),
        }
    }

    /// Looks up an element by id.
    pub fn get(&self, id: &str) -> Option<&Arc<dyn RuleElement>> {
        self.elements.iter().find(|e| e.id() == id)
    }

    /// Iterates elements in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn RuleElement>> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
