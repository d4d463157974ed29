//! Declarative input schema for skills, plus the form metadata derived from it.
//!
//! A [`SchemaNode`] is a small tree: base types (number, boolean, string,
//! object, array) wrapped in any number of modifiers (optional, default,
//! nullable, described). Skills build their schemas with the chained helpers:
//!
//! ```
//! use abacus_types::schema::SchemaNode;
//!
//! let schema = SchemaNode::object([
//!     ("annualIncome", SchemaNode::number().min(0.0).describe("Annual income")),
//!     ("isMarried", SchemaNode::boolean().with_default(false)),
//! ]);
//! assert_eq!(schema.properties().map(|p| p.len()), Some(2));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Schema tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default)]
        integer: bool,
    },
    Boolean,
    String,
    Object {
        #[serde(default)]
        properties: Vec<Property>,
    },
    Array {
        items: Box<SchemaNode>,
    },
    Optional {
        inner: Box<SchemaNode>,
    },
    Nullable {
        inner: Box<SchemaNode>,
    },
    Default {
        inner: Box<SchemaNode>,
        value: Value,
    },
    Described {
        inner: Box<SchemaNode>,
        description: String,
    },
}

/// A named member of an object schema. Order of declaration is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub schema: SchemaNode,
}

impl SchemaNode {
    pub fn number() -> Self {
        Self::Number {
            min: None,
            max: None,
            integer: false,
        }
    }

    pub fn integer() -> Self {
        Self::Number {
            min: None,
            max: None,
            integer: true,
        }
    }

    pub fn boolean() -> Self {
        Self::Boolean
    }

    pub fn string() -> Self {
        Self::String
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::Array {
            items: Box::new(items),
        }
    }

    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        Self::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| Property {
                    name: name.into(),
                    schema,
                })
                .collect(),
        }
    }

    pub fn optional(self) -> Self {
        Self::Optional {
            inner: Box::new(self),
        }
    }

    pub fn nullable(self) -> Self {
        Self::Nullable {
            inner: Box::new(self),
        }
    }

    pub fn with_default(self, value: impl Into<Value>) -> Self {
        Self::Default {
            inner: Box::new(self),
            value: value.into(),
        }
    }

    pub fn describe(self, description: impl Into<String>) -> Self {
        Self::Described {
            inner: Box::new(self),
            description: description.into(),
        }
    }

    /// Lower bound for the numeric base of this node. No-op on non-numeric bases.
    pub fn min(mut self, bound: f64) -> Self {
        if let Self::Number { min, .. } = self.base_mut() {
            *min = Some(bound);
        }
        self
    }

    /// Upper bound for the numeric base of this node. No-op on non-numeric bases.
    pub fn max(mut self, bound: f64) -> Self {
        if let Self::Number { max, .. } = self.base_mut() {
            *max = Some(bound);
        }
        self
    }

    /// The base type under every modifier layer.
    pub fn base(&self) -> &SchemaNode {
        match self {
            Self::Optional { inner }
            | Self::Nullable { inner }
            | Self::Default { inner, .. }
            | Self::Described { inner, .. } => inner.base(),
            other => other,
        }
    }

    fn base_mut(&mut self) -> &mut SchemaNode {
        match self {
            Self::Optional { inner }
            | Self::Nullable { inner }
            | Self::Default { inner, .. }
            | Self::Described { inner, .. } => inner.base_mut(),
            other => other,
        }
    }

    /// Properties of the object base, or `None` when the base is not an object.
    pub fn properties(&self) -> Option<&[Property]> {
        match self.base() {
            Self::Object { properties } => Some(properties),
            _ => None,
        }
    }

    /// Short type name used in validation and log messages.
    pub fn type_name(&self) -> &'static str {
        match self.base() {
            Self::Number { integer: true, .. } => "integer",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Object { .. } => "object",
            Self::Array { .. } => "array",
            _ => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Field metadata
// ---------------------------------------------------------------------------

/// Primitive field classification exposed to form renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    Boolean,
    String,
}

/// Flat metadata for one top-level input parameter.
///
/// Always derived from a skill's input schema and parameter descriptions,
/// never authored by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Value a JSON payload holds, named the way validation messages refer to it.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bounds_apply_through_modifiers() {
        let node = SchemaNode::number()
            .describe("rate")
            .with_default(7)
            .min(0.0)
            .max(100.0);
        assert_eq!(
            node.base(),
            &SchemaNode::Number {
                min: Some(0.0),
                max: Some(100.0),
                integer: false
            }
        );
    }

    #[test]
    fn test_bounds_ignored_on_non_numeric() {
        let node = SchemaNode::string().min(3.0);
        assert_eq!(node, SchemaNode::String);
    }

    #[test]
    fn test_schema_serde_shape() {
        let node = SchemaNode::object([("years", SchemaNode::integer().min(1.0).optional())]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"][0]["name"], "years");
        assert_eq!(json["properties"][0]["schema"]["type"], "optional");
        assert_eq!(json["properties"][0]["schema"]["inner"]["integer"], true);

        let back: SchemaNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_field_meta_uses_type_key() {
        let field = FieldMeta {
            name: "isMarried".into(),
            field_type: FieldType::Boolean,
            label: "Married".into(),
            required: false,
            default: Some(json!(false)),
            min: None,
            max: None,
            step: None,
            unit: None,
        };
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "boolean");
        assert!(json.get("min").is_none());
    }
}
