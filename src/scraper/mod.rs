//! Scrape functions and their observed wrapper.
//!
//! A scrape function takes the caller's OpenTelemetry [`Context`] and returns
//! a [`ScrapeResult`]. [`ObservedScraper`] wraps one and, for every call,
//! records a span and two counters describing what the call achieved.

pub mod observed;
pub mod outcome;

pub use observed::{ObservedScraper, ScrapeObserver};
pub use outcome::{classify, Classification, ScrapeCounts, ScrapeOutcome};

use opentelemetry::Context;

use crate::batch::ScrapeResult;

/// Something that can be scraped for a batch of type `B`.
///
/// Implemented for every `Fn(&Context) -> ScrapeResult<B>` closure, and by
/// [`ObservedScraper`] itself, so a wrapped scraper can stand in wherever the
/// bare one was used.
pub trait Scrape<B>: Send + Sync {
    fn scrape(&self, cx: &Context) -> ScrapeResult<B>;
}

impl<B, F> Scrape<B> for F
where
    F: Fn(&Context) -> ScrapeResult<B> + Send + Sync,
{
    fn scrape(&self, cx: &Context) -> ScrapeResult<B> {
        self(cx)
    }
}
