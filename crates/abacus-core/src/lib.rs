//! Engine logic for Abacus.
//!
//! Owns the skill registry, schema introspection and input validation, the
//! executor that turns skill calls into structured results, the chain runner
//! that wires `$previous.<path>` placeholders between steps, the bounded
//! execution logger, the result adapter layer, and the public allow-list gate.
//! Depends only on `abacus-types`; no transport or IO crates.

pub mod adapter;
pub mod chain;
pub mod executor;
pub mod gate;
pub mod logger;
pub mod registry;
pub mod schema;
pub mod skill;
