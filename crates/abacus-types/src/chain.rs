use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::ErrorBody;

/// One step of a skill chain. String values of the form `$previous.<path>`
/// anywhere inside `input` are replaced with data from the prior step's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStep {
    pub skill_id: String,
    #[serde(default)]
    pub input: Map<String, Value>,
}

impl ChainStep {
    pub fn new(skill_id: impl Into<String>, input: Value) -> Self {
        let input = match input {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            skill_id: skill_id.into(),
            input,
        }
    }
}

/// What happened at one attempted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub skill_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub duration_ms: u64,
}

/// Result of running a chain.
///
/// `steps` holds one outcome per attempted step. On failure the list stops at
/// the failing step and `final_output` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainResult {
    pub success: bool,
    pub steps: Vec<StepOutcome>,
    pub total_duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_output: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chain_step_deserializes_camel_case() {
        let step: ChainStep = serde_json::from_value(json!({
            "skillId": "salary.analyze",
            "input": { "monthlySalary": 50000 }
        }))
        .unwrap();
        assert_eq!(step.skill_id, "salary.analyze");
        assert_eq!(step.input["monthlySalary"], 50000);
    }

    #[test]
    fn test_chain_step_input_defaults_to_empty() {
        let step: ChainStep = serde_json::from_value(json!({ "skillId": "a.b" })).unwrap();
        assert!(step.input.is_empty());
        assert!(ChainStep::new("a.b", json!(3)).input.is_empty());
    }
}
