use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::FieldMeta;

/// Lightweight listing entry for a registered skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameter_descriptions: BTreeMap<String, String>,
}

/// Full description of a skill: its summary plus the introspected form
/// fields and their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDescription {
    #[serde(flatten)]
    pub summary: SkillSummary,
    pub fields: Vec<FieldMeta>,
    pub default_values: Map<String, Value>,
}
