//! Per-run accumulation of step outputs

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Reserved id under which the trigger payload is stored
pub const TRIGGER_ID: &str = "trigger";

/// Outputs of completed steps, keyed by step id in completion order.
///
/// Append-only for the lifetime of a run. Steps receive it by shared
/// reference, so they can read earlier outputs but never alter them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowContext {
    trigger: Value,
    steps: IndexMap<String, Value>,
}

impl WorkflowContext {
    pub fn new(trigger: Value) -> Self {
        Self {
            trigger,
            steps: IndexMap::new(),
        }
    }

    pub fn trigger(&self) -> &Value {
        &self.trigger
    }

    /// Output of step `id`, or the trigger for [`TRIGGER_ID`]
    pub fn get(&self, id: &str) -> Option<&Value> {
        if id == TRIGGER_ID {
            Some(&self.trigger)
        } else {
            self.steps.get(id)
        }
    }

    pub fn steps(&self) -> &IndexMap<String, Value> {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Most recently committed step output
    pub fn last(&self) -> Option<(&str, &Value)> {
        self.steps.last().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn commit(&mut self, id: &str, output: Value) {
        debug_assert!(!self.steps.contains_key(id), "step {id} committed twice");
        self.steps.insert(id.to_string(), output);
    }
}
