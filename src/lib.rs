//! Scrapewatch: span and counter instrumentation for telemetry scrapers.
//!
//! A scrape function collects one batch of telemetry records. Wrapping it in
//! an [`ObservedScraper`] makes every call emit a trace span and increment
//! two counters that tell apart full success, partial failure (some records
//! collected, a known number lost) and total failure.
//!
//! # Modules
//!
//! - [`batch`]: The `Batch` trait and `ScrapeResult`
//! - [`component`]: Receiver/scraper identities and signal kinds
//! - [`config`]: CLI and environment configuration of the binary
//! - [`controller`]: Periodic driver for a receiver's scrapers
//! - [`error`]: Partial and total scrape errors, telemetry setup errors
//! - [`observability`]: Tracer/meter providers, instruments and logging setup
//! - [`sample`]: Synthetic scrapers
//! - [`scraper`]: Outcome classification and the observed wrapper
//! - [`testing`]: In-memory telemetry and counter checks

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // scraper::ScrapeObserver is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc,      // Panic docs can be verbose
    clippy::cast_possible_truncation // usize record counts fit in u64
)]

pub mod batch;
pub mod component;
pub mod config;
pub mod controller;
pub mod error;
pub mod observability;
pub mod sample;
pub mod scraper;
pub mod testing;

pub use batch::{Batch, ScrapeResult};
pub use component::{ComponentId, ComponentIdError, Signal};
pub use controller::{ControllerError, ControllerSettings, ScrapeController};
pub use error::{BoxError, PartialScrapeError, ScrapeError, TelemetryError};
pub use observability::TelemetrySettings;
pub use scraper::{
    classify, Classification, ObservedScraper, Scrape, ScrapeCounts, ScrapeObserver, ScrapeOutcome,
};
