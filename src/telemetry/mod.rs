//! Tracing subscriber setup for the audit-sampler binary.
//!
//! Two flavors: plain `fmt` output filtered through `RUST_LOG`, or bunyan-style json logs plus
//! span export to an OTLP collector (eg: jaeger) when a pass needs to be profiled.
use opentelemetry::sdk::propagation::TraceContextPropagator;
use opentelemetry::sdk::trace::BatchConfig;
use opentelemetry::sdk::{trace, Resource};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use tracing::level_filters::LevelFilter;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use crate::error::{Error, Result};

const SERVICE_NAME: &str = "audit-sampler";

/// Human readable logs on stderr, filtered by `RUST_LOG` (defaults to `info`)
pub fn initialize_fmt_subscriber() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Json logs on stderr plus span export to the OTLP collector at `exporter_endpoint`
///
/// # Errors
/// Returns [`Error::InvalidConfig`] if the OTLP pipeline can't be installed. Must be called
/// from within a tokio runtime.
pub fn initialize_jaeger_subscriber(exporter_endpoint: &str) -> Result<()> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(exporter_endpoint);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::config().with_resource(Resource::new(vec![KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                SERVICE_NAME.to_string(),
            )])),
        )
        .with_batch_config(BatchConfig::default().with_max_queue_size(1024 * 1024))
        .install_batch(opentelemetry::runtime::Tokio)
        .map_err(|e| Error::InvalidConfig {
            reason: format!("Unable to initialize the OTLP tracer - {}", e),
        })?;

    global::set_text_map_propagator(TraceContextPropagator::new());

    Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(
            SERVICE_NAME.to_string(),
            std::io::stderr,
        ))
        .init();

    Ok(())
}

/// Flushes pending spans. No-op when the OTLP subscriber wasn't installed.
pub fn shutdown() {
    global::shutdown_tracer_provider();
}
