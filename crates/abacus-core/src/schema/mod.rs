//! Schema introspection and input validation.
//!
//! Both walk the same [`SchemaNode`](abacus_types::schema::SchemaNode) tree:
//! introspection flattens the top-level properties into form metadata,
//! validation checks a JSON payload against them and applies defaults.

pub mod introspect;
pub mod validate;

pub use introspect::{default_values, introspect};
pub use validate::{check_schema, validate_input};
