//! Periodic driver for the scrapers of one receiver.
//!
//! Every collection interval the controller opens a `scrape_cycle` tracing
//! span and runs each scraper once on the blocking pool, with the cycle span's
//! OpenTelemetry context as parent. Failures are logged and never retried; a
//! scraper that panics loses its slot for that cycle and the others carry on.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::batch::{Batch, ScrapeResult};
use crate::component::ComponentId;
use crate::scraper::{Scrape, ScrapeOutcome};

/// Default time between two scrape cycles.
pub const DEFAULT_COLLECTION_INTERVAL: Duration = Duration::from_secs(60);
/// Default wait before the first cycle.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Errors from the scrape controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("collection interval must be greater than zero")]
    ZeroInterval,
}

/// Scheduling settings of a [`ScrapeController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub collection_interval: Duration,
    pub initial_delay: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            collection_interval: DEFAULT_COLLECTION_INTERVAL,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl ControllerSettings {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.collection_interval.is_zero() {
            return Err(ControllerError::ZeroInterval);
        }
        Ok(())
    }
}

/// Runs a receiver's scrapers on a fixed interval.
pub struct ScrapeController<B> {
    receiver: ComponentId,
    settings: ControllerSettings,
    scrapers: Vec<Arc<dyn Scrape<B>>>,
}

impl<B> ScrapeController<B>
where
    B: Batch + Send + 'static,
{
    /// Create a controller with no scrapers. Fails on invalid settings.
    pub fn new(receiver: ComponentId, settings: ControllerSettings) -> Result<Self, ControllerError> {
        settings.validate()?;
        Ok(Self {
            receiver,
            settings,
            scrapers: Vec::new(),
        })
    }

    /// Add a scraper, usually an [`ObservedScraper`](crate::ObservedScraper).
    #[must_use]
    pub fn with_scraper(mut self, scraper: impl Scrape<B> + 'static) -> Self {
        self.scrapers.push(Arc::new(scraper));
        self
    }

    pub fn receiver(&self) -> &ComponentId {
        &self.receiver
    }

    pub fn settings(&self) -> ControllerSettings {
        self.settings
    }

    /// Run every scraper once, in order, and return their results.
    ///
    /// A scraper whose task panics is logged and left out of the results.
    pub async fn scrape_once(&self) -> Vec<ScrapeResult<B>> {
        let span = tracing::info_span!(
            "scrape_cycle",
            receiver = %self.receiver,
            scrapers = self.scrapers.len()
        );
        let cx = span.context();

        async {
            let mut results = Vec::with_capacity(self.scrapers.len());
            for (index, scraper) in self.scrapers.iter().enumerate() {
                let scraper = Arc::clone(scraper);
                let cx = cx.clone();
                match tokio::task::spawn_blocking(move || scraper.scrape(&cx)).await {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        tracing::error!(
                            receiver = %self.receiver,
                            scraper = index,
                            error = %e,
                            "Scrape task failed, skipping scraper for this cycle"
                        );
                    }
                }
            }
            results
        }
        .instrument(span)
        .await
    }

    /// Scrape every collection interval until `shutdown_rx` flips to `true`
    /// or its sender is dropped.
    ///
    /// Batches from successful and partially failed scrapes are passed to
    /// `consume`; batches from failed scrapes are dropped. Returns the number
    /// of completed cycles.
    pub async fn run<C>(self, mut shutdown_rx: watch::Receiver<bool>, mut consume: C) -> u64
    where
        C: FnMut(B),
    {
        if *shutdown_rx.borrow() {
            return 0;
        }

        tracing::info!(
            receiver = %self.receiver,
            scrapers = self.scrapers.len(),
            interval_ms = self.settings.collection_interval.as_millis() as u64,
            "Starting scrape controller"
        );

        tokio::select! {
            _ = tokio::time::sleep(self.settings.initial_delay) => {}
            _ = shutdown_rx.changed() => {
                tracing::info!(receiver = %self.receiver, "Scrape controller stopped before first cycle");
                return 0;
            }
        }

        let mut ticker = tokio::time::interval(self.settings.collection_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cycles = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for result in self.scrape_once().await {
                        self.dispatch(result, &mut consume);
                    }
                    cycles += 1;
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(receiver = %self.receiver, cycles, "Scrape controller stopped");
        cycles
    }

    fn dispatch<C>(&self, result: ScrapeResult<B>, consume: &mut C)
    where
        C: FnMut(B),
    {
        let outcome = result.classify().outcome;
        let (batch, error) = result.into_parts();
        match (outcome, error) {
            (ScrapeOutcome::TotalFailure, Some(err)) => {
                tracing::error!(receiver = %self.receiver, error = %err, "Scrape failed, batch dropped");
            }
            (ScrapeOutcome::PartialFailure, Some(err)) => {
                tracing::warn!(receiver = %self.receiver, error = %err, "Scrape partially failed");
                consume(batch);
            }
            _ => consume(batch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_is_rejected() {
        let settings = ControllerSettings {
            collection_interval: Duration::ZERO,
            initial_delay: Duration::ZERO,
        };
        let receiver = ComponentId::new("sample").unwrap();
        assert!(matches!(
            ScrapeController::<Vec<u8>>::new(receiver, settings),
            Err(ControllerError::ZeroInterval)
        ));
    }

    #[test]
    fn test_default_settings() {
        let settings = ControllerSettings::default();
        assert_eq!(settings.collection_interval, Duration::from_secs(60));
        assert!(settings.validate().is_ok());
    }
}
