//! Telemetry handles passed to observed scrapers.

use opentelemetry::metrics::{Meter, MeterProvider as _};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};

use crate::error::TelemetryError;

/// Instrumentation scope name for spans and instruments emitted by this crate.
pub const INSTRUMENTATION_SCOPE: &str = "scrapewatch";

/// Tracer and meter providers used to observe scrapes.
///
/// Both providers are cheap to clone and safe to share between threads.
/// The default value records nothing anywhere.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySettings {
    pub tracer_provider: TracerProvider,
    pub meter_provider: SdkMeterProvider,
}

impl TelemetrySettings {
    pub fn new(tracer_provider: TracerProvider, meter_provider: SdkMeterProvider) -> Self {
        Self {
            tracer_provider,
            meter_provider,
        }
    }

    pub fn tracer(&self) -> Tracer {
        self.tracer_provider.tracer(INSTRUMENTATION_SCOPE)
    }

    pub fn meter(&self) -> Meter {
        self.meter_provider.meter(INSTRUMENTATION_SCOPE)
    }

    /// Flush and shut down both providers.
    ///
    /// Both are always shut down; the first error is reported.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        let traces = self.tracer_provider.shutdown();
        let metrics = self.meter_provider.shutdown();
        traces?;
        metrics?;
        Ok(())
    }
}
