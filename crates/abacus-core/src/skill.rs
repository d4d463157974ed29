//! Skill descriptors: identity, input contract, and the executable handler.
//!
//! A [`SkillDescriptor`] is built once (usually at startup) and handed to the
//! [`Registry`](crate::registry::Registry), which owns it for the process
//! lifetime. Descriptors are immutable after construction and shared as
//! `Arc<SkillDescriptor>`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use abacus_types::schema::SchemaNode;
use abacus_types::skill::SkillSummary;
use serde_json::Value;

/// The executable part of a skill: validated input in, output or error out.
pub type SkillHandler = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SkillDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub tags: BTreeSet<String>,
    pub input_schema: SchemaNode,
    /// Checked after successful runs; a mismatch is logged, never fatal.
    pub output_schema: Option<SchemaNode>,
    pub parameter_descriptions: BTreeMap<String, String>,
    handler: SkillHandler,
}

impl SkillDescriptor {
    /// Start a descriptor with the given id and display name.
    ///
    /// Version defaults to `1.0.0` and the input schema to an empty object.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> SkillBuilder {
        SkillBuilder {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            version: "1.0.0".to_string(),
            tags: BTreeSet::new(),
            input_schema: SchemaNode::object(Vec::<(String, SchemaNode)>::new()),
            output_schema: None,
            parameter_descriptions: BTreeMap::new(),
        }
    }

    /// Run the handler. Callers are expected to have validated `input` first.
    pub fn invoke(&self, input: Value) -> anyhow::Result<Value> {
        (self.handler)(input)
    }

    pub fn summary(&self) -> SkillSummary {
        SkillSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            tags: self.tags.iter().cloned().collect(),
            parameter_descriptions: self.parameter_descriptions.clone(),
        }
    }
}

impl fmt::Debug for SkillDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct SkillBuilder {
    id: String,
    name: String,
    description: String,
    version: String,
    tags: BTreeSet<String>,
    input_schema: SchemaNode,
    output_schema: Option<SchemaNode>,
    parameter_descriptions: BTreeMap<String, String>,
}

impl SkillBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn input(mut self, schema: SchemaNode) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn output(mut self, schema: SchemaNode) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.parameter_descriptions
            .insert(name.into(), description.into());
        self
    }

    /// Attach the handler and finish the descriptor.
    pub fn handle<F>(self, handler: F) -> SkillDescriptor
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        SkillDescriptor {
            id: self.id,
            name: self.name,
            description: self.description,
            version: self.version,
            tags: self.tags,
            input_schema: self.input_schema,
            output_schema: self.output_schema,
            parameter_descriptions: self.parameter_descriptions,
            handler: Arc::new(handler),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_defaults_and_invoke() {
        let skill = SkillDescriptor::builder("demo.echo", "Echo")
            .tags(["demo", "util"])
            .param("value", "Value to echo")
            .handle(|input| Ok(input));

        assert_eq!(skill.version, "1.0.0");
        assert_eq!(skill.input_schema.properties().map(|p| p.len()), Some(0));
        assert_eq!(skill.invoke(json!({"a": 1})).unwrap(), json!({"a": 1}));

        let summary = skill.summary();
        assert_eq!(summary.tags, vec!["demo".to_string(), "util".to_string()]);
        assert_eq!(summary.parameter_descriptions["value"], "Value to echo");
    }

    #[test]
    fn test_debug_omits_handler() {
        let skill = SkillDescriptor::builder("demo.echo", "Echo").handle(Ok);
        let debug = format!("{skill:?}");
        assert!(debug.contains("demo.echo"));
        assert!(!debug.contains("handler"));
    }
}
