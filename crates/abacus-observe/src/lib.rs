//! Observability setup for Abacus: structured diagnostic logging with an
//! optional OpenTelemetry trace exporter.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, shutdown_tracing};
