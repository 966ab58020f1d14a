//! Span and counter instrumentation around a scrape function.
//!
//! Every call to an [`ObservedScraper`]:
//! 1. starts a `scraper/<scraper>/Scrape<Signal>` span under the caller's context
//! 2. runs the wrapped function with that same caller context
//! 3. classifies the result (see [`classify`](super::classify))
//! 4. sets the scraped/errored count attributes and the span status
//! 5. adds the counts to the receiver/scraper labeled counters
//! 6. ends the span and hands the result back untouched

use std::future::Future;
use std::marker::PhantomData;

use opentelemetry::trace::{Span as _, Status, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::{Span, Tracer};

use crate::batch::{Batch, ScrapeResult};
use crate::component::{ComponentId, Signal};
use crate::error::TelemetryError;
use crate::observability::metrics::{scraper_labels, ScraperInstruments};
use crate::observability::TelemetrySettings;
use crate::scraper::outcome::{Classification, ScrapeOutcome};
use crate::scraper::Scrape;

/// Component kind used as the first segment of span names.
const SPAN_COMPONENT_KIND: &str = "scraper";

/// The identities, tracer and counters shared by all calls of one scraper.
///
/// Usable on its own to observe scrape code that does not fit the
/// [`Scrape`] shape: call [`start`](Self::start) before the work and
/// [`finish`](Self::finish) with its result.
#[derive(Debug)]
pub struct ScrapeObserver {
    receiver: ComponentId,
    scraper: ComponentId,
    signal: Signal,
    span_name: String,
    tracer: Tracer,
    instruments: ScraperInstruments,
    labels: Vec<KeyValue>,
}

impl ScrapeObserver {
    /// Create the counters for `signal`. Fails if the meter rejects them.
    pub fn new(
        receiver: ComponentId,
        scraper: ComponentId,
        signal: Signal,
        settings: &TelemetrySettings,
    ) -> Result<Self, TelemetryError> {
        let instruments = ScraperInstruments::new(&settings.meter(), signal)?;
        let span_name = format!(
            "{SPAN_COMPONENT_KIND}/{scraper}/{}",
            signal.span_operation()
        );
        let labels = scraper_labels(&receiver, &scraper);
        Ok(Self {
            receiver,
            scraper,
            signal,
            span_name,
            tracer: settings.tracer(),
            instruments,
            labels,
        })
    }

    pub fn receiver(&self) -> &ComponentId {
        &self.receiver
    }

    pub fn scraper(&self) -> &ComponentId {
        &self.scraper
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn span_name(&self) -> &str {
        &self.span_name
    }

    /// Open the span for one scrape as a child of the span active in `parent`.
    pub fn start(&self, parent: &Context) -> ScrapeSpan {
        let span = self
            .tracer
            .start_with_context(self.span_name.clone(), parent);
        ScrapeSpan { span: Some(span) }
    }

    /// Record the result of the scrape started with `span` and end the span.
    pub fn finish<B: Batch>(&self, mut span: ScrapeSpan, result: &ScrapeResult<B>) -> Classification {
        let classification = result.classify();
        let counts = classification.counts;

        span.set_attribute(KeyValue::new(self.signal.scraped_key(), to_i64(counts.scraped)));
        span.set_attribute(KeyValue::new(self.signal.errored_key(), to_i64(counts.errored)));
        if let Some(err) = &result.error {
            span.set_status(Status::error(err.to_string()));
        }

        self.instruments.record(counts, &self.labels);

        match classification.outcome {
            ScrapeOutcome::Success => tracing::debug!(
                receiver = %self.receiver,
                scraper = %self.scraper,
                signal = %self.signal,
                scraped = counts.scraped,
                "Scrape succeeded"
            ),
            outcome => tracing::debug!(
                receiver = %self.receiver,
                scraper = %self.scraper,
                signal = %self.signal,
                %outcome,
                scraped = counts.scraped,
                errored = counts.errored,
                error = result.error.as_ref().map(tracing::field::display),
                "Scrape failed"
            ),
        }

        span.end();
        classification
    }
}

fn to_i64(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// The span of one in-flight scrape.
///
/// Ended by [`ScrapeObserver::finish`]. If it is dropped instead, because the
/// scrape panicked or an async scrape was dropped mid-flight, the span is
/// still ended, with an `Error` status and no counts.
#[derive(Debug)]
pub struct ScrapeSpan {
    span: Option<Span>,
}

impl ScrapeSpan {
    fn set_attribute(&mut self, attribute: KeyValue) {
        if let Some(span) = self.span.as_mut() {
            span.set_attribute(attribute);
        }
    }

    fn set_status(&mut self, status: Status) {
        if let Some(span) = self.span.as_mut() {
            span.set_status(status);
        }
    }

    fn end(mut self) {
        if let Some(mut span) = self.span.take() {
            span.end();
        }
    }
}

impl Drop for ScrapeSpan {
    fn drop(&mut self) {
        if let Some(mut span) = self.span.take() {
            let description = if std::thread::panicking() {
                "scrape function panicked"
            } else {
                "scrape abandoned before completion"
            };
            span.set_status(Status::error(description));
            span.end();
        }
    }
}

/// A scrape function wrapped with span and counter instrumentation.
///
/// The result of the wrapped function is returned exactly as produced.
/// Safe to call from many threads at once; each call owns its span and only
/// the counters are shared.
pub struct ObservedScraper<B, F> {
    observer: ScrapeObserver,
    scrape_fn: F,
    _batch: PhantomData<fn() -> B>,
}

impl<B, F> ObservedScraper<B, F> {
    /// Wrap `scrape_fn`, labeling its telemetry with `receiver` and `scraper`.
    ///
    /// Fails if the counter instruments cannot be created.
    pub fn new(
        receiver: ComponentId,
        scraper: ComponentId,
        signal: Signal,
        settings: &TelemetrySettings,
        scrape_fn: F,
    ) -> Result<Self, TelemetryError> {
        Ok(Self {
            observer: ScrapeObserver::new(receiver, scraper, signal, settings)?,
            scrape_fn,
            _batch: PhantomData,
        })
    }

    pub fn observer(&self) -> &ScrapeObserver {
        &self.observer
    }

    pub fn into_inner(self) -> F {
        self.scrape_fn
    }
}

impl<B, F, Fut> ObservedScraper<B, F>
where
    B: Batch,
    F: Fn(Context) -> Fut,
    Fut: Future<Output = ScrapeResult<B>>,
{
    /// Observe one call of an async scrape function.
    ///
    /// The caller's context is passed through as is. Dropping the returned
    /// future before it completes ends the span without recording counts.
    pub async fn scrape_async(&self, cx: Context) -> ScrapeResult<B> {
        let span = self.observer.start(&cx);
        let result = (self.scrape_fn)(cx).await;
        self.observer.finish(span, &result);
        result
    }
}

impl<B, F> Scrape<B> for ObservedScraper<B, F>
where
    B: Batch,
    F: Scrape<B>,
{
    fn scrape(&self, cx: &Context) -> ScrapeResult<B> {
        let span = self.observer.start(cx);
        let result = self.scrape_fn.scrape(cx);
        self.observer.finish(span, &result);
        result
    }
}

impl<B, F> std::fmt::Debug for ObservedScraper<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservedScraper")
            .field("observer", &self.observer)
            .finish_non_exhaustive()
    }
}
