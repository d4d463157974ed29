//! Derive [`FieldMeta`] and default form values from an input schema.

use std::collections::BTreeMap;

use abacus_types::schema::{FieldMeta, FieldType, SchemaNode};
use serde_json::{Map, Value};

const CURRENCY_UNIT: &str = "TWD";
const PERCENT_UNIT: &str = "%";
const YEAR_UNIT: &str = "years";

const RATE_STEP: f64 = 0.1;
const AMOUNT_STEP: f64 = 1000.0;

/// Flatten the top-level properties of `schema` into field metadata.
///
/// Fields whose base type is an object or array are skipped. A schema whose
/// root is not an object yields no fields.
pub fn introspect(
    schema: &SchemaNode,
    parameter_descriptions: &BTreeMap<String, String>,
) -> Vec<FieldMeta> {
    let Some(properties) = schema.properties() else {
        tracing::debug!(
            root = schema.type_name(),
            "schema root is not an object, no form fields available"
        );
        return Vec::new();
    };

    properties
        .iter()
        .filter_map(|prop| {
            field_meta(
                &prop.name,
                &prop.schema,
                parameter_descriptions.get(&prop.name),
            )
        })
        .collect()
}

/// Build the initial form values for `fields`.
///
/// Declared defaults win; otherwise numbers get `0`, booleans `false`, and
/// strings `""`.
pub fn default_values(fields: &[FieldMeta]) -> Map<String, Value> {
    fields
        .iter()
        .map(|field| {
            let value = match (&field.default, field.field_type) {
                (Some(v), _) => v.clone(),
                (None, FieldType::Number) => Value::from(0),
                (None, FieldType::Boolean) => Value::Bool(false),
                (None, FieldType::String) => Value::String(String::new()),
            };
            (field.name.clone(), value)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Per-field extraction
// ---------------------------------------------------------------------------

/// Modifier layers peeled off a property schema.
struct Unwrapped<'a> {
    base: &'a SchemaNode,
    required: bool,
    default: Option<Value>,
    description: Option<&'a str>,
}

fn unwrap_modifiers(node: &SchemaNode) -> Unwrapped<'_> {
    let mut current = node;
    let mut required = true;
    let mut default = None;
    let mut description = None;

    loop {
        match current {
            SchemaNode::Optional { inner } => {
                required = false;
                current = inner;
            }
            // Null is accepted but the key must still be present.
            SchemaNode::Nullable { inner } => current = inner,
            SchemaNode::Default { inner, value } => {
                // Outermost default is the one applied at validation time.
                if default.is_none() {
                    default = Some(value.clone());
                }
                required = false;
                current = inner;
            }
            SchemaNode::Described { inner, description: text } => {
                if description.is_none() {
                    description = Some(text.as_str());
                }
                current = inner;
            }
            base => {
                return Unwrapped {
                    base,
                    required,
                    default,
                    description,
                };
            }
        }
    }
}

fn field_meta(name: &str, schema: &SchemaNode, param_desc: Option<&String>) -> Option<FieldMeta> {
    let Unwrapped {
        base,
        required,
        default,
        description,
    } = unwrap_modifiers(schema);

    let label = param_desc
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .or(description)
        .unwrap_or(name)
        .to_string();

    let mut meta = FieldMeta {
        name: name.to_string(),
        field_type: FieldType::String,
        label,
        required,
        default,
        min: None,
        max: None,
        step: None,
        unit: None,
    };

    match base {
        SchemaNode::Number { min, max, .. } => {
            let lower = name.to_lowercase();
            meta.field_type = FieldType::Number;
            meta.min = *min;
            meta.max = *max;
            meta.step = Some(if lower.contains("rate") {
                RATE_STEP
            } else {
                AMOUNT_STEP
            });
            meta.unit = unit_for(&lower).map(String::from);
        }
        SchemaNode::Boolean => {
            meta.field_type = FieldType::Boolean;
            meta.default.get_or_insert(Value::Bool(false));
        }
        SchemaNode::String => {}
        other => {
            tracing::debug!(
                field = name,
                kind = other.type_name(),
                "skipping field with unsupported type"
            );
            return None;
        }
    }

    Some(meta)
}

/// Display unit guessed from the (lowercased) field name.
fn unit_for(lower_name: &str) -> Option<&'static str> {
    if ["salary", "amount", "income", "payment"]
        .iter()
        .any(|k| lower_name.contains(k))
    {
        Some(CURRENCY_UNIT)
    } else if lower_name.contains("rate") {
        Some(PERCENT_UNIT)
    } else if lower_name.contains("year") {
        Some(YEAR_UNIT)
    } else {
        None
    }
}
