//! Intent - Scenario classification of user requests

mod classifier;
mod scenario;

pub use classifier::{parse_intent, IntentClassifier};
pub use scenario::Scenario;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Classified request. Created once per turn and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Matched scenario
    pub scenario: Scenario,
    /// Classifier confidence in `[0, 1]`
    pub confidence: f32,
    /// Extracted slots (`location_a`, `budget`, `constraint_1`, ...)
    pub entities: BTreeMap<String, String>,
    /// Advisory tool names, in suggested order
    pub recommended_tool_hints: Vec<String>,
    /// Advisory analysis steps
    #[serde(default)]
    pub analysis_plan: Vec<String>,
}

impl Intent {
    /// Create an intent with no entities
    #[must_use]
    pub fn new(scenario: Scenario, confidence: f32) -> Self {
        Self {
            scenario,
            confidence: clamp_confidence(confidence),
            entities: BTreeMap::new(),
            recommended_tool_hints: template_hints(scenario),
            analysis_plan: Vec::new(),
        }
    }

    /// Fallback used whenever classification fails
    #[must_use]
    pub fn unclassified() -> Self {
        Self::new(Scenario::Unclassified, 0.0)
    }

    /// Add an entity slot
    #[must_use]
    pub fn with_entity(mut self, slot: impl Into<String>, value: impl Into<String>) -> Self {
        self.entities.insert(slot.into(), value.into());
        self
    }

    /// Location slot values in slot order
    #[must_use]
    pub fn locations(&self) -> Vec<&str> {
        self.entities
            .iter()
            .filter(|(k, _)| k.starts_with("location_"))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Whether a real scenario was matched
    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.scenario != Scenario::Unclassified
    }
}

pub(crate) fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub(crate) fn template_hints(scenario: Scenario) -> Vec<String> {
    scenario
        .required_tools()
        .iter()
        .map(|t| t.name().to_string())
        .collect()
}
