//! HTTP request handlers for the REST API.

pub mod chain;
pub mod public;
pub mod skill;
pub mod stats;
