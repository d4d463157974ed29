//! Allow-list gate for untrusted callers.
//!
//! Public execution only reaches the registry for ids listed in
//! `public.allowed`. Ids reserved for trusted surfaces (`public.local_only`)
//! are refused as forbidden; anything else is reported as not found, whether
//! or not the registry knows it. Handler error messages are withheld from
//! public callers.

use abacus_types::config::PublicConfig;
use abacus_types::error::EngineError;
use abacus_types::log::ExecutionSource;
use serde_json::Value;

use crate::executor::SkillExecutor;

pub const REDACTED_MESSAGE: &str = "internal error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicGate {
    allowed: Vec<String>,
    local_only: Vec<String>,
}

impl PublicGate {
    pub fn new(allowed: Vec<String>, local_only: Vec<String>) -> Self {
        Self {
            allowed,
            local_only,
        }
    }

    pub fn from_config(config: &PublicConfig) -> Self {
        Self::new(config.allowed.clone(), config.local_only.clone())
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn check(&self, skill_id: &str) -> Result<(), EngineError> {
        if self.local_only.iter().any(|id| id == skill_id) {
            return Err(EngineError::Forbidden {
                id: skill_id.to_string(),
                allowed: self.allowed.clone(),
            });
        }
        if !self.allowed.iter().any(|id| id == skill_id) {
            return Err(EngineError::NotFound {
                id: skill_id.to_string(),
                known: self.allowed.clone(),
            });
        }
        Ok(())
    }

    /// Check the allow-list, then execute with source `api`.
    pub fn execute<E: SkillExecutor + ?Sized>(
        &self,
        executor: &E,
        skill_id: &str,
        input: Value,
    ) -> Result<Value, EngineError> {
        self.check(skill_id)?;
        executor
            .execute(skill_id, input, Some(ExecutionSource::Api))
            .map_err(|e| match e {
                EngineError::Execution(message) => {
                    tracing::error!(skill_id, error = %message, "public execution failed");
                    EngineError::Execution(REDACTED_MESSAGE.to_string())
                }
                EngineError::NotFound { id, .. } => EngineError::NotFound {
                    id,
                    known: self.allowed.clone(),
                },
                other => other,
            })
    }
}
