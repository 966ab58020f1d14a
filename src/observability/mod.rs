//! OpenTelemetry plumbing shared by every observed scraper.
//!
//! Provides:
//! - [`TelemetrySettings`]: the tracer and meter providers handed to scrapers
//! - Counter instruments and meter provider setup
//! - Structured logging with an optional OpenTelemetry bridge

pub mod metrics;
pub mod settings;
pub mod tracing;

pub use settings::TelemetrySettings;
