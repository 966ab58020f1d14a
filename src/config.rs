//! Configuration parsing for the scrapewatch binary.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Sensible defaults for quick start

use std::time::Duration;

use clap::Parser;

use crate::component::{ComponentId, Signal};
use crate::controller::{ControllerError, ControllerSettings};

/// Scrapewatch: runs an instrumented sample scraper on a fixed interval.
#[derive(Parser, Debug, Clone)]
#[command(name = "scrapewatch")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Receiver identity (`kind` or `kind/name`)
    #[arg(long, env = "SCRAPEWATCH_RECEIVER", default_value = "sample")]
    pub receiver: ComponentId,

    /// Scraper identity (`kind` or `kind/name`)
    #[arg(long, env = "SCRAPEWATCH_SCRAPER", default_value = "sample/logs")]
    pub scraper: ComponentId,

    /// Signal produced by the sample scraper
    #[arg(long, env = "SCRAPEWATCH_SIGNAL", value_enum, default_value_t = Signal::Logs)]
    pub signal: Signal,

    /// Milliseconds between two scrape cycles
    #[arg(long, env = "SCRAPEWATCH_COLLECTION_INTERVAL_MS", default_value_t = 10_000)]
    pub collection_interval_ms: u64,

    /// Milliseconds to wait before the first scrape cycle
    #[arg(long, env = "SCRAPEWATCH_INITIAL_DELAY_MS", default_value_t = 1_000)]
    pub initial_delay_ms: u64,

    /// Records produced by each scrape
    #[arg(long, env = "SCRAPEWATCH_RECORDS_PER_SCRAPE", default_value_t = 100)]
    pub records_per_scrape: usize,

    /// Report a partial failure every N-th scrape (0 disables)
    #[arg(long, env = "SCRAPEWATCH_PARTIAL_EVERY", default_value_t = 0)]
    pub partial_every: u64,

    /// Records lost by each injected partial failure
    #[arg(long, env = "SCRAPEWATCH_FAILED_RECORDS", default_value_t = 2)]
    pub failed_records: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "SCRAPEWATCH_LOG_JSON")]
    pub log_json: bool,

    /// OpenTelemetry collector endpoint for span and metric export (optional)
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otel_endpoint: Option<String>,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Scheduling settings for the scrape controller.
    pub fn controller_settings(&self) -> Result<ControllerSettings, ControllerError> {
        let settings = ControllerSettings {
            collection_interval: Duration::from_millis(self.collection_interval_ms),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Create a default configuration for testing.
    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            collection_interval_ms: 10,
            initial_delay_ms: 0,
            records_per_scrape: 5,
            log_level: "debug".into(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            receiver: ComponentId::new("sample").expect("valid receiver id"),
            scraper: ComponentId::with_name("sample", "logs").expect("valid scraper id"),
            signal: Signal::Logs,
            collection_interval_ms: 10_000,
            initial_delay_ms: 1_000,
            records_per_scrape: 100,
            partial_every: 0,
            failed_records: 2,
            log_level: "info".into(),
            log_json: false,
            otel_endpoint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.receiver.to_string(), "sample");
        assert_eq!(config.scraper.to_string(), "sample/logs");
        assert_eq!(
            config.controller_settings().unwrap().collection_interval,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_parse_cli_arguments() {
        let config = Config::try_parse_from([
            "scrapewatch",
            "--receiver",
            "hostmetrics/edge",
            "--scraper",
            "cpu",
            "--signal",
            "metrics",
            "--partial-every",
            "3",
        ])
        .unwrap();
        assert_eq!(config.receiver.name(), Some("edge"));
        assert_eq!(config.scraper.kind(), "cpu");
        assert_eq!(config.signal, Signal::Metrics);
        assert_eq!(config.partial_every, 3);
    }

    #[test]
    fn test_invalid_receiver_is_rejected() {
        let result = Config::try_parse_from(["scrapewatch", "--receiver", "9bad"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = Config {
            collection_interval_ms: 0,
            ..Config::test_config()
        };
        assert!(config.controller_settings().is_err());
    }
}
