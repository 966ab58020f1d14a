//! Synthetic scrapers used by the `scrapewatch` binary and by tests.
//!
//! [`SampleScraper`] produces a fixed number of records per call and can be
//! told to report a partial failure every N-th call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use opentelemetry::Context;

use crate::batch::ScrapeResult;
use crate::scraper::Scrape;

/// A generated log record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: SystemTime,
    pub severity: &'static str,
    pub body: String,
}

/// A generated metric data point.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub name: String,
    pub timestamp: SystemTime,
    pub value: f64,
}

/// Generate `count` log records.
pub fn generate_logs(count: usize) -> Vec<LogRecord> {
    let now = SystemTime::now();
    (0..count)
        .map(|i| LogRecord {
            timestamp: now,
            severity: if i % 2 == 0 { "INFO" } else { "ERROR" },
            body: format!("log record {i}"),
        })
        .collect()
}

/// Generate `count` metric data points.
pub fn generate_metrics(count: usize) -> Vec<MetricPoint> {
    let now = SystemTime::now();
    (0..count)
        .map(|i| MetricPoint {
            name: format!("sample.metric.{}", i % 4),
            timestamp: now,
            value: i as f64,
        })
        .collect()
}

/// Failure injected by [`SampleScraper`].
#[derive(Debug, thiserror::Error)]
#[error("injected failure on scrape {call}: {failed} records dropped")]
pub struct InjectedFailure {
    pub call: u64,
    pub failed: usize,
}

/// A scraper that makes up its records.
#[derive(Debug)]
pub struct SampleScraper<T> {
    generate: fn(usize) -> Vec<T>,
    records_per_scrape: usize,
    partial_every: u64,
    failed_records: usize,
    calls: AtomicU64,
}

impl<T> SampleScraper<T> {
    /// Produce `records_per_scrape` records per call with `generate`.
    pub fn new(generate: fn(usize) -> Vec<T>, records_per_scrape: usize) -> Self {
        Self {
            generate,
            records_per_scrape,
            partial_every: 0,
            failed_records: 0,
            calls: AtomicU64::new(0),
        }
    }

    /// Every `every`-th call loses `failed_records` of its records.
    /// `every == 0` disables injection.
    #[must_use]
    pub fn with_partial_failures(mut self, every: u64, failed_records: usize) -> Self {
        self.partial_every = every;
        self.failed_records = failed_records;
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl SampleScraper<LogRecord> {
    pub fn logs(records_per_scrape: usize) -> Self {
        Self::new(generate_logs, records_per_scrape)
    }
}

impl SampleScraper<MetricPoint> {
    pub fn metrics(records_per_scrape: usize) -> Self {
        Self::new(generate_metrics, records_per_scrape)
    }
}

impl<T: Send + Sync> Scrape<Vec<T>> for SampleScraper<T> {
    fn scrape(&self, _cx: &Context) -> ScrapeResult<Vec<T>> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if self.partial_every > 0 && call % self.partial_every == 0 {
            let failed = self.failed_records.min(self.records_per_scrape);
            let batch = (self.generate)(self.records_per_scrape - failed);
            return ScrapeResult::partial(batch, InjectedFailure { call, failed }, failed);
        }
        ScrapeResult::ok((self.generate)(self.records_per_scrape))
    }
}
