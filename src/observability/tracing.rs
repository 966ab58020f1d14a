//! Logging setup and the OpenTelemetry tracer provider.
//!
//! Configures structured logging with:
//! - Environment-based filter (via RUST_LOG)
//! - Plain or JSON console output
//! - An optional bridge that turns `tracing` spans into OpenTelemetry spans,
//!   so a `tracing` span can parent the spans of observed scrapes

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::observability::settings::INSTRUMENTATION_SCOPE;

/// Initialize logging.
///
/// # Arguments
///
/// * `log_level` - Filter directive used when `RUST_LOG` is not set
/// * `json` - Emit one JSON object per event instead of plain text
/// * `tracer_provider` - When given, `tracing` spans are exported through it
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_tracing(log_level: &str, json: bool, tracer_provider: Option<&TracerProvider>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info,scrapewatch=debug"));

    let (text_layer, json_layer) = if json {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            ),
        )
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            ),
            None,
        )
    };

    let otel_layer = tracer_provider.map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(INSTRUMENTATION_SCOPE))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(otel_layer)
        .init();

    tracing::info!(log_level, json, "Tracing initialized");
}

/// Initialize tracing for tests (only logs errors).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("error")
        .with_test_writer()
        .try_init();
}

/// Build the tracer provider for the binary.
///
/// With an endpoint, spans are batched and exported over OTLP/gRPC.
/// Without one (or if the exporter cannot be built) spans are created
/// but dropped when they end.
pub fn build_tracer_provider(otel_endpoint: Option<&str>) -> TracerProvider {
    if let Some(endpoint) = otel_endpoint {
        use opentelemetry_otlp::{Protocol, WithExportConfig};

        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint)
            .with_protocol(Protocol::Grpc);

        match opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(exporter)
            .install_batch(opentelemetry_sdk::runtime::Tokio)
        {
            Ok(provider) => {
                tracing::info!(endpoint, "OTLP span exporter configured");
                return provider;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create OTLP span exporter, spans will not be exported");
            }
        }
    }

    TracerProvider::default()
}
