//! Chain runner: execute steps in order, piping each output into the next
//! step's placeholders.
//!
//! A step whose placeholders cannot be resolved is recorded as a
//! `chain_resolution` failure without reaching the executor. Any failed step
//! aborts the chain; the outcomes up to and including it are returned.

use std::time::Instant;

use abacus_types::chain::{ChainResult, ChainStep, StepOutcome};
use abacus_types::envelope::ErrorBody;
use abacus_types::error::EngineError;
use abacus_types::log::ExecutionSource;
use serde_json::{Map, Value};

use super::path::{Placeholder, is_placeholder};
use crate::executor::SkillExecutor;

/// Run `steps` sequentially through `executor`.
///
/// # Errors
///
/// Returns [`EngineError::EmptyChain`] when `steps` is empty. Step failures
/// are not errors here: they are reported inside the returned [`ChainResult`].
pub fn run_chain<E: SkillExecutor + ?Sized>(
    executor: &E,
    steps: &[ChainStep],
) -> Result<ChainResult, EngineError> {
    if steps.is_empty() {
        return Err(EngineError::EmptyChain);
    }

    let chain_start = Instant::now();
    let mut previous: Option<Value> = None;
    let mut outcomes = Vec::with_capacity(steps.len());
    let mut success = true;

    for (i, step) in steps.iter().enumerate() {
        let step_start = Instant::now();
        let result = resolve_input(&step.input, previous.as_ref()).and_then(|input| {
            executor.execute(&step.skill_id, Value::Object(input), Some(ExecutionSource::Chain))
        });
        let duration_ms = elapsed_ms(step_start);

        match result {
            Ok(output) => {
                outcomes.push(StepOutcome {
                    skill_id: step.skill_id.clone(),
                    success: true,
                    output: Some(output.clone()),
                    error: None,
                    duration_ms,
                });
                previous = Some(output);
            }
            Err(e) => {
                tracing::warn!(
                    position = i,
                    skill_id = %step.skill_id,
                    kind = %e.kind(),
                    error = %e,
                    "skill chain aborted"
                );
                outcomes.push(StepOutcome {
                    skill_id: step.skill_id.clone(),
                    success: false,
                    output: None,
                    error: Some(ErrorBody::from(e)),
                    duration_ms,
                });
                success = false;
                break;
            }
        }
    }

    Ok(ChainResult {
        success,
        steps: outcomes,
        total_duration_ms: elapsed_ms(chain_start),
        final_output: if success { previous } else { None },
    })
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Placeholder substitution
// ---------------------------------------------------------------------------

/// Replace every placeholder string inside `input`, at any depth.
pub fn resolve_input(
    input: &Map<String, Value>,
    previous: Option<&Value>,
) -> Result<Map<String, Value>, EngineError> {
    input
        .iter()
        .map(|(key, value)| resolve_value(value, previous, key).map(|v| (key.clone(), v)))
        .collect()
}

fn resolve_value(
    value: &Value,
    previous: Option<&Value>,
    field: &str,
) -> Result<Value, EngineError> {
    match value {
        Value::String(s) if is_placeholder(s) => Placeholder::parse(s)
            .and_then(|p| p.resolve(previous))
            .map_err(|reason| EngineError::ChainResolution {
                field: field.to_string(),
                reason,
            }),
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| {
                resolve_value(v, previous, &format!("{field}.{key}")).map(|v| (key.clone(), v))
            })
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| resolve_value(v, previous, &format!("{field}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use abacus_types::error::{ErrorKind, PathError};
    use serde_json::json;

    /// Records every call and answers from a fixed script.
    struct SpyExecutor {
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl SpyExecutor {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SkillExecutor for SpyExecutor {
        fn execute(
            &self,
            skill_id: &str,
            input: Value,
            source: Option<ExecutionSource>,
        ) -> Result<Value, EngineError> {
            assert_eq!(source, Some(ExecutionSource::Chain));
            self.calls
                .lock()
                .unwrap()
                .push((skill_id.to_string(), input.clone()));
            match skill_id {
                "salary.analyze" => Ok(json!({"annual": {"gross": 600000, "net": 480000}})),
                "tax.calculate" => Ok(json!({"payTax": 12345, "echo": input})),
                "broken.step" => Err(EngineError::Execution("boom".into())),
                other => Err(EngineError::NotFound {
                    id: other.to_string(),
                    known: vec![],
                }),
            }
        }
    }

    fn step(id: &str, input: Value) -> ChainStep {
        ChainStep::new(id, input)
    }

    #[test]
    fn test_empty_chain_rejected() {
        let spy = SpyExecutor::new();
        assert_eq!(run_chain(&spy, &[]).unwrap_err(), EngineError::EmptyChain);
    }

    #[test]
    fn test_previous_path_is_substituted() {
        let spy = SpyExecutor::new();
        let result = run_chain(
            &spy,
            &[
                step("salary.analyze", json!({"monthlySalary": 50000})),
                step("tax.calculate", json!({"income": "$previous.annual.gross"})),
            ],
        )
        .unwrap();

        assert!(result.success);
        assert_eq!(result.steps.len(), 2);
        assert_eq!(spy.calls()[1].1, json!({"income": 600000}));
        assert_eq!(result.final_output.unwrap()["payTax"], 12345);
    }

    #[test]
    fn test_nested_placeholders_and_literals() {
        let spy = SpyExecutor::new();
        run_chain(
            &spy,
            &[
                step("salary.analyze", json!({})),
                step(
                    "tax.calculate",
                    json!({
                        "whole": "$previous",
                        "nested": {"net": "$previous.annual.net", "list": ["$previous.annual.gross", 1]},
                        "literal": "$previously",
                    }),
                ),
            ],
        )
        .unwrap();

        let calls = spy.calls();
        let (_, input) = &calls[1];
        assert_eq!(input["whole"]["annual"]["net"], 480000);
        assert_eq!(input["nested"]["net"], 480000);
        assert_eq!(input["nested"]["list"], json!([600000, 1]));
        assert_eq!(input["literal"], "$previously");
    }

    #[test]
    fn test_failed_step_aborts_chain() {
        let spy = SpyExecutor::new();
        let result = run_chain(
            &spy,
            &[
                step("broken.step", json!({})),
                step("tax.calculate", json!({"income": 1})),
            ],
        )
        .unwrap();

        assert!(!result.success);
        assert_eq!(result.steps.len(), 1);
        assert!(!result.steps[0].success);
        assert_eq!(
            result.steps[0].error.as_ref().map(|e| e.kind),
            Some(ErrorKind::Execution)
        );
        assert!(result.final_output.is_none());
        assert_eq!(spy.calls().len(), 1);
    }

    #[test]
    fn test_resolution_failure_skips_executor() {
        let spy = SpyExecutor::new();
        let result = run_chain(
            &spy,
            &[
                step("salary.analyze", json!({})),
                step("tax.calculate", json!({"income": "$previous.annual.bonus"})),
                step("salary.analyze", json!({})),
            ],
        )
        .unwrap();

        assert!(!result.success);
        assert_eq!(result.steps.len(), 2);
        assert!(result.steps[0].success);

        let error = result.steps[1].error.as_ref().unwrap();
        assert_eq!(error.kind, ErrorKind::ChainResolution);
        assert_eq!(error.details, Some(json!({"field": "income"})));
        assert_eq!(spy.calls().len(), 1);
    }

    #[test]
    fn test_placeholder_in_first_step_has_no_previous() {
        let spy = SpyExecutor::new();
        let result =
            run_chain(&spy, &[step("tax.calculate", json!({"income": "$previous.x"}))]).unwrap();
        assert!(!result.success);
        assert!(spy.calls().is_empty());
        assert!(
            result.steps[0]
                .error
                .as_ref()
                .unwrap()
                .message
                .contains(&PathError::NoPrevious.to_string())
        );
    }

    #[test]
    fn test_single_step_chain_wraps_execute() {
        let spy = SpyExecutor::new();
        let result = run_chain(&spy, &[step("salary.analyze", json!({}))]).unwrap();
        assert!(result.success);
        assert_eq!(result.steps.len(), 1);
        assert_eq!(
            result.final_output,
            Some(json!({"annual": {"gross": 600000, "net": 480000}}))
        );
    }
}
