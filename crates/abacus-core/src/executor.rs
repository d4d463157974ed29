//! Skill execution: lookup, validation, invocation, and logging.
//!
//! [`Executor`] is the trust boundary between callers and skill handlers.
//! Handler errors and panics are converted into [`EngineError`] values here;
//! nothing a handler does escapes as an unwind to the transport layer.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use abacus_types::chain::{ChainResult, ChainStep};
use abacus_types::error::EngineError;
use abacus_types::log::{ExecutionLogEntry, ExecutionSource};
use serde_json::Value;

use crate::chain::run_chain;
use crate::logger::ExecutionLogger;
use crate::registry::Registry;
use crate::schema::validate_input;

// ---------------------------------------------------------------------------
// Executor trait
// ---------------------------------------------------------------------------

/// Anything that can run a single skill by id.
///
/// The chain runner is generic over this so tests can substitute a spy.
pub trait SkillExecutor: Send + Sync {
    fn execute(
        &self,
        skill_id: &str,
        input: Value,
        source: Option<ExecutionSource>,
    ) -> Result<Value, EngineError>;
}

// ---------------------------------------------------------------------------
// Registry-backed executor
// ---------------------------------------------------------------------------

pub struct Executor {
    registry: Arc<Registry>,
    logger: Arc<ExecutionLogger>,
}

impl Executor {
    pub fn new(registry: Arc<Registry>, logger: Arc<ExecutionLogger>) -> Self {
        Self { registry, logger }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn logger(&self) -> &Arc<ExecutionLogger> {
        &self.logger
    }

    /// Run `steps` in order, feeding each step's output to the next.
    pub fn execute_chain(&self, steps: &[ChainStep]) -> Result<ChainResult, EngineError> {
        run_chain(self, steps)
    }

    fn fail(
        &self,
        skill_id: &str,
        input: Value,
        err: EngineError,
        duration_ms: u64,
        source: Option<ExecutionSource>,
    ) -> EngineError {
        self.logger.record(ExecutionLogEntry::failure(
            skill_id,
            input,
            err.kind(),
            err.to_string(),
            duration_ms,
            source,
        ));
        err
    }
}

impl SkillExecutor for Executor {
    fn execute(
        &self,
        skill_id: &str,
        input: Value,
        source: Option<ExecutionSource>,
    ) -> Result<Value, EngineError> {
        let Some(skill) = self.registry.get(skill_id) else {
            tracing::warn!(skill_id, source = ?source, "execution requested for unknown skill");
            return Err(EngineError::NotFound {
                id: skill_id.to_string(),
                known: self.registry.ids(),
            });
        };

        let validated = match validate_input(&skill.input_schema, &input) {
            Ok(v) => v,
            Err(e) => return Err(self.fail(skill_id, input, e, 0, source)),
        };

        let start = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| skill.invoke(validated)));
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(Ok(output)) => {
                if let Some(Err(e)) = skill
                    .output_schema
                    .as_ref()
                    .map(|schema| validate_input(schema, &output))
                {
                    tracing::warn!(skill_id, error = %e, "skill output does not match its declared schema");
                }
                self.logger.record(ExecutionLogEntry::success(
                    skill_id,
                    input,
                    output.clone(),
                    duration_ms,
                    source,
                ));
                Ok(output)
            }
            Ok(Err(e)) => {
                let err = EngineError::Execution(format!("{e:#}"));
                Err(self.fail(skill_id, input, err, duration_ms, source))
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                let err = EngineError::Execution(format!("skill panicked: {reason}"));
                Err(self.fail(skill_id, input, err, duration_ms, source))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use abacus_types::error::ErrorKind;
    use abacus_types::schema::SchemaNode;
    use serde_json::json;

    use crate::skill::SkillDescriptor;

    fn setup() -> (Executor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(Registry::new());

        let counter = Arc::clone(&calls);
        registry
            .register(
                SkillDescriptor::builder("math.double", "Double")
                    .input(SchemaNode::object([
                        ("a", SchemaNode::number()),
                        ("factor", SchemaNode::number().with_default(2)),
                    ]))
                    .handle(move |input| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        let a = input["a"].as_f64().unwrap_or_default();
                        let factor = input["factor"].as_f64().unwrap_or_default();
                        Ok(json!({ "result": a * factor }))
                    }),
            )
            .unwrap();
        registry
            .register(
                SkillDescriptor::builder("math.fail", "Fail")
                    .handle(|_| Err(anyhow::anyhow!("division by zero"))),
            )
            .unwrap();
        registry
            .register(SkillDescriptor::builder("math.panic", "Panic").handle(|_| panic!("kaboom")))
            .unwrap();

        let executor = Executor::new(registry, Arc::new(ExecutionLogger::new(10)));
        (executor, calls)
    }

    #[test]
    fn test_validation_precedes_execution() {
        let (executor, calls) = setup();
        let err = executor
            .execute("math.double", json!({}), Some(ExecutionSource::Api))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let recent = executor.logger().recent(1);
        let entry = &recent[0];
        assert!(!entry.success);
        assert_eq!(entry.duration_ms, 0);
        assert_eq!(entry.error_kind, Some(ErrorKind::Validation));
        assert_eq!(entry.source, Some(ExecutionSource::Api));
    }

    #[test]
    fn test_success_applies_defaults_and_logs() {
        let (executor, calls) = setup();
        let output = executor
            .execute("math.double", json!({"a": 21}), None)
            .unwrap();

        assert_eq!(output, json!({"result": 42.0}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let recent = executor.logger().recent(1);
        let entry = &recent[0];
        assert!(entry.success);
        assert_eq!(entry.skill_id, "math.double");
        assert_eq!(entry.input, json!({"a": 21}));
        assert_eq!(entry.output, Some(json!({"result": 42.0})));
    }

    #[test]
    fn test_unknown_skill_is_not_logged() {
        let (executor, _) = setup();
        let err = executor.execute("math.nope", json!({}), None).unwrap_err();
        let EngineError::NotFound { id, known } = err else {
            panic!("expected not found");
        };
        assert_eq!(id, "math.nope");
        assert_eq!(known, vec!["math.double", "math.fail", "math.panic"]);
        assert!(executor.logger().is_empty());
    }

    #[test]
    fn test_handler_error_becomes_execution_error() {
        let (executor, _) = setup();
        let err = executor.execute("math.fail", json!({}), None).unwrap_err();
        assert_eq!(err, EngineError::Execution("division by zero".into()));

        let recent = executor.logger().recent(1);
        let entry = &recent[0];
        assert_eq!(entry.error_kind, Some(ErrorKind::Execution));
        assert_eq!(
            entry.error.as_deref(),
            Some("execution failed: division by zero")
        );
    }

    #[test]
    fn test_panic_is_contained() {
        let (executor, _) = setup();
        let err = executor.execute("math.panic", json!({}), None).unwrap_err();
        assert_eq!(err, EngineError::Execution("skill panicked: kaboom".into()));
        assert_eq!(executor.logger().len(), 1);
    }

    #[test]
    fn test_repeated_calls_re_execute() {
        let (executor, calls) = setup();
        let a = executor.execute("math.double", json!({"a": 3}), None).unwrap();
        let b = executor.execute("math.double", json!({"a": 3}), None).unwrap();
        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_output_schema_mismatch_is_not_fatal() {
        let registry = Arc::new(Registry::new());
        registry
            .register(
                SkillDescriptor::builder("demo.loose", "Loose")
                    .output(SchemaNode::object([("total", SchemaNode::number())]))
                    .handle(|_| Ok(json!({"total": "many"}))),
            )
            .unwrap();
        let executor = Executor::new(registry, Arc::new(ExecutionLogger::default()));
        assert_eq!(
            executor.execute("demo.loose", json!({}), None).unwrap(),
            json!({"total": "many"})
        );
    }
}
