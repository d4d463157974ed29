use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ErrorKind;

/// Where an execution request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionSource {
    Api,
    Chat,
    Chain,
}

impl fmt::Display for ExecutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Chat => write!(f, "chat"),
            Self::Chain => write!(f, "chain"),
        }
    }
}

/// One record per execution attempt of a known skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLogEntry {
    pub id: Uuid,
    pub skill_id: String,
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    pub duration_ms: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ExecutionSource>,
}

impl ExecutionLogEntry {
    pub fn success(
        skill_id: impl Into<String>,
        input: Value,
        output: Value,
        duration_ms: u64,
        source: Option<ExecutionSource>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            skill_id: skill_id.into(),
            input,
            output: Some(output),
            duration_ms,
            success: true,
            error: None,
            error_kind: None,
            timestamp: Utc::now(),
            source,
        }
    }

    pub fn failure(
        skill_id: impl Into<String>,
        input: Value,
        kind: ErrorKind,
        error: impl Into<String>,
        duration_ms: u64,
        source: Option<ExecutionSource>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            skill_id: skill_id.into(),
            input,
            output: None,
            duration_ms,
            success: false,
            error: Some(error.into()),
            error_kind: Some(kind),
            timestamp: Utc::now(),
            source,
        }
    }
}

/// Per-skill aggregate inside [`LogStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillStats {
    pub count: u64,
    pub success_count: u64,
    pub total_duration_ms: u64,
}

/// Aggregate statistics over the entries currently retained by the logger.
///
/// `success_rate` is a percentage in `[0, 100]`; both it and
/// `avg_duration_ms` are `0.0` when there are no entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub success_rate: f64,
    pub avg_duration_ms: f64,
    pub by_skill: BTreeMap<String, SkillStats>,
}
