//! Shared fixtures for scrapewatch integration tests.
//!
//! Provides:
//! - Receiver and scraper identities
//! - A parent span context to scrape under
//! - Errors to return from test scrapers

#![allow(dead_code)]

use opentelemetry::trace::{SpanId, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use scrapewatch::testing::TestTelemetry;
use scrapewatch::ComponentId;

/// Receiver identity used across tests.
pub fn receiver_id() -> ComponentId {
    "fakereceiver".parse().expect("valid receiver id")
}

/// Scraper identity used across tests.
pub fn scraper_id() -> ComponentId {
    "fakescraper/main".parse().expect("valid scraper id")
}

/// Plain failure; nothing collected can be trusted.
#[derive(Debug, thiserror::Error)]
#[error("errFake")]
pub struct FakeError;

/// Cause wrapped in partial failures.
#[derive(Debug, thiserror::Error)]
#[error("partialErrFake")]
pub struct FakePartialCause;

/// Start a parent span and return the context carrying it plus its span id.
pub fn parent_context(tt: &TestTelemetry, name: &'static str) -> (Context, SpanId) {
    let span = tt.settings().tracer().start(name);
    let cx = Context::current_with_span(span);
    let span_id = cx.span().span_context().span_id();
    (cx, span_id)
}

/// Whether `attributes` holds `key` with integer `value`.
pub fn has_int_attribute(attributes: &[KeyValue], key: &'static str, value: i64) -> bool {
    attributes.contains(&KeyValue::new(key, value))
}
