//! OTLP metrics setup and the per-scraper counter instruments.
//!
//! Each observed scraper owns two monotonic counters:
//! - `scraper_scraped_<records>`: records collected
//! - `scraper_errored_<records>`: records lost to partial failures
//!
//! Both are labeled with `receiver` and `scraper`.

use opentelemetry::metrics::{Counter, Meter};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::{ManualReader, SdkMeterProvider};

use crate::component::{ComponentId, Signal};
use crate::error::TelemetryError;
use crate::scraper::ScrapeCounts;

/// Label key carrying the receiver identity.
pub const RECEIVER_KEY: &str = "receiver";
/// Label key carrying the scraper identity.
pub const SCRAPER_KEY: &str = "scraper";

/// Counter pair owned by one observed scraper.
#[derive(Debug, Clone)]
pub struct ScraperInstruments {
    scraped: Counter<u64>,
    errored: Counter<u64>,
}

impl ScraperInstruments {
    /// Create both counters for `signal` on `meter`.
    pub fn new(meter: &Meter, signal: Signal) -> Result<Self, TelemetryError> {
        let scraped = meter
            .u64_counter(signal.scraped_metric_name())
            .with_description("Number of records successfully scraped")
            .with_unit(signal.unit())
            .try_init()
            .map_err(|source| TelemetryError::Instrument {
                name: signal.scraped_metric_name(),
                source,
            })?;
        let errored = meter
            .u64_counter(signal.errored_metric_name())
            .with_description("Number of records that were unable to be scraped")
            .with_unit(signal.unit())
            .try_init()
            .map_err(|source| TelemetryError::Instrument {
                name: signal.errored_metric_name(),
                source,
            })?;
        Ok(Self { scraped, errored })
    }

    /// Add one scrape's counts. Both counters are always touched, even by zero.
    pub fn record(&self, counts: ScrapeCounts, labels: &[KeyValue]) {
        self.scraped.add(counts.scraped, labels);
        self.errored.add(counts.errored, labels);
    }
}

/// Labels attached to every measurement of a scraper.
pub fn scraper_labels(receiver: &ComponentId, scraper: &ComponentId) -> Vec<KeyValue> {
    vec![
        KeyValue::new(RECEIVER_KEY, receiver.to_string()),
        KeyValue::new(SCRAPER_KEY, scraper.to_string()),
    ]
}

/// Build the meter provider for the binary.
///
/// With an endpoint, measurements are pushed over OTLP/gRPC every 10 seconds.
/// Without one (or if the exporter cannot be built) a manual reader keeps
/// them in memory only.
pub fn build_meter_provider(otel_endpoint: Option<&str>) -> SdkMeterProvider {
    if let Some(endpoint) = otel_endpoint {
        use opentelemetry_otlp::{Protocol, WithExportConfig};

        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint)
            .with_protocol(Protocol::Grpc);

        match opentelemetry_otlp::new_pipeline()
            .metrics(opentelemetry_sdk::runtime::Tokio)
            .with_exporter(exporter)
            .with_period(std::time::Duration::from_secs(10))
            .build()
        {
            Ok(provider) => {
                tracing::info!(endpoint, "OTLP metrics exporter configured");
                return provider;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create OTLP metrics exporter, metrics stay in memory");
            }
        }
    }

    let reader = ManualReader::builder().build();
    SdkMeterProvider::builder().with_reader(reader).build()
}
