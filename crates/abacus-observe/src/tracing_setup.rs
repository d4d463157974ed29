//! Tracing subscriber initialization.
//!
//! # Usage
//!
//! ```no_run
//! use abacus_types::config::LoggingConfig;
//!
//! // Configured level and format
//! abacus_observe::init_tracing(&LoggingConfig::default(), None).unwrap();
//! ```
//!
//! Output goes to stderr so `--json` command output on stdout stays
//! machine-readable.

use std::error::Error;
use std::sync::OnceLock;

use abacus_types::config::{LogFormat, LoggingConfig};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

const TRACER_NAME: &str = "abacus";

/// Build the level filter. A non-empty `RUST_LOG` wins over the override,
/// which wins over the configured level.
pub fn build_filter(
    rust_log: Option<&str>,
    level_override: Option<&str>,
    configured: &str,
) -> Result<EnvFilter, ParseError> {
    let directive = rust_log
        .filter(|s| !s.trim().is_empty())
        .or(level_override)
        .unwrap_or(configured);
    EnvFilter::try_new(directive)
}

/// Initialize the global tracing subscriber.
///
/// - Installs a `fmt` layer in text or JSON form per `config.format`.
/// - When `config.otel` is set, bridges spans to OpenTelemetry with a stdout
///   exporter.
/// - `level_override` comes from CLI verbosity flags.
///
/// # Errors
///
/// Returns an error if the filter directive does not parse or a global
/// subscriber is already installed.
pub fn init_tracing(
    config: &LoggingConfig,
    level_override: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let env_filter = build_filter(rust_log.as_deref(), level_override, &config.level)?;

    let fmt_layer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    };

    let otel_layer = if config.otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer(TRACER_NAME);

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// No-op when OTel was not enabled.
pub fn shutdown_tracing() {
    if let Some(Err(e)) = TRACER_PROVIDER.get().map(SdkTracerProvider::shutdown) {
        eprintln!("Warning: OTel tracer provider shutdown error: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_rust_log_wins() {
        let filter = build_filter(Some("trace"), Some("warn"), "info").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_override_beats_configured_level() {
        let filter = build_filter(None, Some("debug"), "info").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = build_filter(Some("  "), None, "info").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_invalid_directive_is_rejected() {
        assert!(build_filter(None, None, "abacus=notalevel").is_err());
    }

    #[test]
    fn test_shutdown_without_otel_is_noop() {
        shutdown_tracing();
    }
}
