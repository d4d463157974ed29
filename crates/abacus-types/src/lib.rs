//! Shared domain types for Abacus.
//!
//! This crate contains the data shapes exchanged between the engine, the
//! skill catalog, and the transports: schema descriptions, field metadata,
//! execution log entries, chain steps/results, the response envelope, and the
//! engine error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chain;
pub mod config;
pub mod envelope;
pub mod error;
pub mod log;
pub mod schema;
pub mod skill;
