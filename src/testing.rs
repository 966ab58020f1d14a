//! In-memory telemetry for verifying observed scrapers.
//!
//! [`TestTelemetry`] wires an SDK tracer provider to an in-memory span
//! exporter and an SDK meter provider to an in-memory metrics exporter, then
//! lets a test assert on the spans that ended and on the cumulative counter
//! totals recorded for a receiver/scraper pair.
//!
//! ```
//! use opentelemetry::Context;
//! use scrapewatch::testing::TestTelemetry;
//! use scrapewatch::{ComponentId, ObservedScraper, Scrape, ScrapeResult, Signal};
//!
//! let tt = TestTelemetry::new();
//! let receiver: ComponentId = "sample".parse().unwrap();
//! let scraper: ComponentId = "sample/logs".parse().unwrap();
//! let observed: ObservedScraper<Vec<u32>, _> = ObservedScraper::new(
//!     receiver.clone(),
//!     scraper.clone(),
//!     Signal::Logs,
//!     &tt.settings(),
//!     |_: &Context| ScrapeResult::ok(vec![1, 2, 3]),
//! )
//! .unwrap();
//!
//! observed.scrape(&Context::new());
//! assert!(tt.check_scraper_logs(&receiver, &scraper, 3, 0).is_ok());
//! assert!(tt.check_scraper_logs(&receiver, &scraper, 3, 1).is_err());
//! ```

use opentelemetry::metrics::MetricsError;
use opentelemetry::trace::TraceError;
use opentelemetry::KeyValue;
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::metrics::data::Sum;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::runtime;
use opentelemetry_sdk::testing::metrics::InMemoryMetricsExporter;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;

use crate::component::{ComponentId, Signal};
use crate::error::TelemetryError;
use crate::observability::metrics::scraper_labels;
use crate::observability::TelemetrySettings;

/// A counter total that did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub metric: &'static str,
    pub expected: u64,
    pub actual: u64,
}

/// Why a scraper check failed.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("unexpected counter totals: {}", format_mismatches(.0))]
    Mismatch(Vec<Mismatch>),

    #[error("failed to collect metrics: {0}")]
    Collect(#[from] MetricsError),
}

fn format_mismatches(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(|m| format!("{} expected {} got {}", m.metric, m.expected, m.actual))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Telemetry providers backed by in-memory exporters.
pub struct TestTelemetry {
    settings: TelemetrySettings,
    span_exporter: InMemorySpanExporter,
    metric_exporter: InMemoryMetricsExporter,
}

impl TestTelemetry {
    pub fn new() -> Self {
        let span_exporter = InMemorySpanExporter::default();
        let tracer_provider = TracerProvider::builder()
            .with_simple_exporter(span_exporter.clone())
            .build();

        // The periodic reader's worker runs on its own thread, so flushing
        // works from plain tests as well as from inside a tokio runtime.
        let metric_exporter = InMemoryMetricsExporter::default();
        let reader = PeriodicReader::builder(metric_exporter.clone(), runtime::TokioCurrentThread)
            .build();
        let meter_provider = SdkMeterProvider::builder().with_reader(reader).build();

        Self {
            settings: TelemetrySettings::new(tracer_provider, meter_provider),
            span_exporter,
            metric_exporter,
        }
    }

    /// Settings to hand to the scrapers under test.
    pub fn settings(&self) -> TelemetrySettings {
        self.settings.clone()
    }

    /// Spans that have ended, in the order they ended.
    pub fn finished_spans(&self) -> Result<Vec<SpanData>, TraceError> {
        self.span_exporter.get_finished_spans()
    }

    /// Check the cumulative log record totals of a scraper.
    pub fn check_scraper_logs(
        &self,
        receiver: &ComponentId,
        scraper: &ComponentId,
        scraped: u64,
        errored: u64,
    ) -> Result<(), CheckError> {
        self.check_scraper(Signal::Logs, receiver, scraper, scraped, errored)
    }

    /// Check the cumulative metric point totals of a scraper.
    pub fn check_scraper_metrics(
        &self,
        receiver: &ComponentId,
        scraper: &ComponentId,
        scraped: u64,
        errored: u64,
    ) -> Result<(), CheckError> {
        self.check_scraper(Signal::Metrics, receiver, scraper, scraped, errored)
    }

    /// Succeeds only if both recorded totals equal the expected ones.
    ///
    /// A counter that was never recorded for this pair counts as zero.
    pub fn check_scraper(
        &self,
        signal: Signal,
        receiver: &ComponentId,
        scraper: &ComponentId,
        scraped: u64,
        errored: u64,
    ) -> Result<(), CheckError> {
        let labels = scraper_labels(receiver, scraper);
        let expected = [
            (signal.scraped_metric_name(), scraped),
            (signal.errored_metric_name(), errored),
        ];

        let mut mismatches = Vec::new();
        for (metric, expected) in expected {
            let actual = self.counter_total(metric, &labels)?;
            if actual != expected {
                mismatches.push(Mismatch {
                    metric,
                    expected,
                    actual,
                });
            }
        }

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(CheckError::Mismatch(mismatches))
        }
    }

    /// Current cumulative total of a `u64` counter for exactly `labels`.
    pub fn counter_total(&self, metric: &str, labels: &[KeyValue]) -> Result<u64, CheckError> {
        self.settings.meter_provider.force_flush()?;
        let exported = self.metric_exporter.get_finished_metrics()?;

        // Temporality is cumulative, so the latest export holds the totals.
        let Some(latest) = exported.last() else {
            return Ok(0);
        };

        let total = latest
            .scope_metrics
            .iter()
            .flat_map(|scope| scope.metrics.iter())
            .filter(|m| m.name == metric)
            .filter_map(|m| m.data.as_any().downcast_ref::<Sum<u64>>())
            .flat_map(|sum| sum.data_points.iter())
            .filter(|point| same_labels(&point.attributes, labels))
            .map(|point| point.value)
            .sum();
        Ok(total)
    }

    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        self.settings.shutdown()
    }
}

impl Default for TestTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

fn same_labels(actual: &[KeyValue], expected: &[KeyValue]) -> bool {
    actual.len() == expected.len() && expected.iter().all(|kv| actual.contains(kv))
}
