//! Scrapewatch: runs an instrumented sample scraper on a fixed interval.
//!
//! # Usage
//!
//! ```bash
//! scrapewatch --receiver sample --scraper sample/logs --partial-every 5
//! ```
//!
//! Environment variables can also be used:
//! - `SCRAPEWATCH_COLLECTION_INTERVAL_MS`: Time between scrape cycles
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Where to export spans and metrics
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use anyhow::Context as _;
use scrapewatch::config::Config;
use scrapewatch::observability::metrics::build_meter_provider;
use scrapewatch::observability::tracing::{build_tracer_provider, init_tracing};
use scrapewatch::sample::{LogRecord, MetricPoint, SampleScraper};
use scrapewatch::{Batch, ObservedScraper, Scrape, ScrapeController, Signal, TelemetrySettings};
use tokio::sync::watch;

/// Print startup banner with version and configuration.
fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        r#"
  Scrapewatch v{} - observed scrape runner

  Configuration:
    Receiver:   {}
    Scraper:    {} ({})
    Interval:   {} ms
    OTLP:       {}

  Press Ctrl+C to shutdown gracefully.
"#,
        version,
        config.receiver,
        config.scraper,
        config.signal,
        config.collection_interval_ms,
        config.otel_endpoint.as_deref().unwrap_or("disabled"),
    );
}

/// Wrap `scraper` and drive it until shutdown.
async fn run_scraper<B, S>(
    config: &Config,
    telemetry: &TelemetrySettings,
    scraper: S,
    shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<u64>
where
    B: Batch + Send + 'static,
    S: Scrape<B> + 'static,
{
    let observed: ObservedScraper<B, S> = ObservedScraper::new(
        config.receiver.clone(),
        config.scraper.clone(),
        config.signal,
        telemetry,
        scraper,
    )
    .context("failed to create scraper instruments")?;

    let controller = ScrapeController::new(config.receiver.clone(), config.controller_settings()?)?
        .with_scraper(observed);

    let cycles = controller
        .run(shutdown_rx, |batch: B| {
            tracing::info!(records = batch.record_count(), "Batch collected");
        })
        .await;
    Ok(cycles)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Build providers first so the logging bridge can export spans
    let tracer_provider = build_tracer_provider(config.otel_endpoint.as_deref());
    let meter_provider = build_meter_provider(config.otel_endpoint.as_deref());
    init_tracing(&config.log_level, config.log_json, Some(&tracer_provider));
    let telemetry = TelemetrySettings::new(tracer_provider, meter_provider);

    print_banner(&config);

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn signal handler task
    tokio::spawn(async move {
        // Wait for SIGTERM or SIGINT (Ctrl+C)
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("failed to listen for ctrl+c");
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }

        // Signal shutdown
        let _ = shutdown_tx.send(true);
    });

    let cycles = match config.signal {
        Signal::Logs => {
            let scraper = SampleScraper::logs(config.records_per_scrape)
                .with_partial_failures(config.partial_every, config.failed_records);
            run_scraper::<Vec<LogRecord>, _>(&config, &telemetry, scraper, shutdown_rx).await?
        }
        Signal::Metrics => {
            let scraper = SampleScraper::metrics(config.records_per_scrape)
                .with_partial_failures(config.partial_every, config.failed_records);
            run_scraper::<Vec<MetricPoint>, _>(&config, &telemetry, scraper, shutdown_rx).await?
        }
    };

    telemetry
        .shutdown()
        .context("failed to flush telemetry on shutdown")?;

    tracing::info!(cycles, "Scrapewatch shutdown complete");
    Ok(())
}
