//! Result adapters: per-skill enrichment of raw output for presentation.
//!
//! Adapters are keyed by skill id like the registry. A skill without an
//! adapter passes through unchanged. Adapters read their arguments by
//! reference and build a new value, so callers keep the raw output intact.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

pub type AdapterFn = Arc<dyn Fn(&Value, &Value) -> Value + Send + Sync>;

#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, AdapterFn>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `adapter` for `skill_id`, replacing any previous one.
    pub fn register<F>(&mut self, skill_id: impl Into<String>, adapter: F)
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.adapters.insert(skill_id.into(), Arc::new(adapter));
    }

    pub fn has(&self, skill_id: &str) -> bool {
        self.adapters.contains_key(skill_id)
    }

    /// Presentation payload for `output`, or a copy of `output` when no
    /// adapter is registered for `skill_id`.
    pub fn adapt(&self, skill_id: &str, input: &Value, output: &Value) -> Value {
        match self.adapters.get(skill_id) {
            Some(adapter) => adapter(input, output),
            None => output.clone(),
        }
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&String> = self.adapters.keys().collect();
        ids.sort();
        f.debug_struct("AdapterRegistry").field("skills", &ids).finish()
    }
}

// ---------------------------------------------------------------------------
// Helpers for adapter authors
// ---------------------------------------------------------------------------

/// Copy of `output` with `extra` fields merged on top.
///
/// A non-object output is wrapped as `{ "value": output }` first so the
/// result is always an object.
pub fn enrich(output: &Value, extra: impl IntoIterator<Item = (&'static str, Value)>) -> Value {
    let mut map = match output {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => Map::from_iter([("value".to_string(), other.clone())]),
    };
    for (key, value) in extra {
        map.insert(key.to_string(), value);
    }
    Value::Object(map)
}

/// Numeric field at `key`, or `0.0` when absent or not a number.
pub fn number_at(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}
