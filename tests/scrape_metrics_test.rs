//! Observed metric scrapers, sync and async.
//!
//! Tests:
//! - Async scrapes record metric point counters and span attributes
//! - Cancellation surfaced as an error is a total failure
//! - Manual start/finish through a ScrapeObserver
//! - Log and metric counters of the same scraper stay apart

mod common;

use std::time::Duration;

use futures::future::join_all;
use opentelemetry::trace::Status;
use opentelemetry::Context;
use scrapewatch::sample::{generate_metrics, MetricPoint, SampleScraper};
use scrapewatch::testing::TestTelemetry;
use scrapewatch::{
    ObservedScraper, Scrape, ScrapeError, ScrapeObserver, ScrapeOutcome, ScrapeResult, Signal,
};

use common::{has_int_attribute, parent_context, receiver_id, scraper_id, FakeError};

#[derive(Debug, thiserror::Error)]
#[error("scrape cancelled")]
struct Cancelled;

#[tokio::test]
async fn test_async_scrapes_record_metric_points() {
    let tt = TestTelemetry::new();
    let (parent_cx, parent_span_id) = parent_context(&tt, "test_async_scrapes");

    let observed: ObservedScraper<Vec<MetricPoint>, _> = ObservedScraper::new(
        receiver_id(),
        scraper_id(),
        Signal::Metrics,
        &tt.settings(),
        |_cx: Context| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            ScrapeResult::partial(generate_metrics(10), "one shard unreachable", 3)
        },
    )
    .unwrap();

    let results = join_all((0..4).map(|_| observed.scrape_async(parent_cx.clone()))).await;
    assert!(results.iter().all(|r| r.batch.len() == 10));

    let spans = tt.finished_spans().unwrap();
    assert_eq!(spans.len(), 4);
    for span in &spans {
        assert_eq!(span.name, "scraper/fakescraper/main/ScrapeMetrics");
        assert_eq!(span.parent_span_id, parent_span_id);
        assert_eq!(span.status, Status::error("one shard unreachable"));
        assert!(has_int_attribute(&span.attributes, "scraped_metric_points", 10));
        assert!(has_int_attribute(&span.attributes, "errored_metric_points", 3));
    }

    tt.check_scraper_metrics(&receiver_id(), &scraper_id(), 40, 12)
        .unwrap();
    // The log counters of this scraper were never touched.
    tt.check_scraper_logs(&receiver_id(), &scraper_id(), 0, 0)
        .unwrap();
}

#[tokio::test]
async fn test_cancellation_error_is_total_failure() {
    let tt = TestTelemetry::new();
    let observed: ObservedScraper<Vec<MetricPoint>, _> = ObservedScraper::new(
        receiver_id(),
        scraper_id(),
        Signal::Metrics,
        &tt.settings(),
        |_cx: Context| async {
            let timed_out = tokio::time::timeout(
                Duration::from_millis(5),
                std::future::pending::<Vec<MetricPoint>>(),
            )
            .await;
            match timed_out {
                Ok(batch) => ScrapeResult::ok(batch),
                Err(_) => ScrapeResult::failed(generate_metrics(2), Cancelled),
            }
        },
    )
    .unwrap();

    let result = observed.scrape_async(Context::new()).await;
    let err = result.error.unwrap();
    assert!(err.is::<Cancelled>());

    let spans = tt.finished_spans().unwrap();
    assert_eq!(spans[0].status, Status::error("scrape cancelled"));
    assert!(has_int_attribute(&spans[0].attributes, "scraped_metric_points", 0));
    tt.check_scraper_metrics(&receiver_id(), &scraper_id(), 0, 0)
        .unwrap();
}

#[test]
fn test_observer_start_and_finish() {
    let tt = TestTelemetry::new();
    let observer = ScrapeObserver::new(
        receiver_id(),
        scraper_id(),
        Signal::Metrics,
        &tt.settings(),
    )
    .unwrap();

    let span = observer.start(&Context::new());
    let result: ScrapeResult<Vec<MetricPoint>> = ScrapeResult {
        batch: generate_metrics(6),
        error: Some(ScrapeError::other(FakeError)),
    };
    let classification = observer.finish(span, &result);
    assert_eq!(classification.outcome, ScrapeOutcome::TotalFailure);

    let span = observer.start(&Context::new());
    let classification = observer.finish(span, &ScrapeResult::ok(generate_metrics(6)));
    assert_eq!(classification.outcome, ScrapeOutcome::Success);

    assert_eq!(tt.finished_spans().unwrap().len(), 2);
    tt.check_scraper_metrics(&receiver_id(), &scraper_id(), 6, 0)
        .unwrap();
}

#[test]
fn test_sample_scraper_wrapped() {
    let tt = TestTelemetry::new();
    let observed: ObservedScraper<Vec<MetricPoint>, _> = ObservedScraper::new(
        receiver_id(),
        scraper_id(),
        Signal::Metrics,
        &tt.settings(),
        SampleScraper::metrics(10).with_partial_failures(2, 4),
    )
    .unwrap();

    for _ in 0..4 {
        observed.scrape(&Context::new());
    }

    // Calls 2 and 4 lose 4 of their 10 points.
    tt.check_scraper_metrics(&receiver_id(), &scraper_id(), 10 + 6 + 10 + 6, 8)
        .unwrap();
    assert_eq!(observed.into_inner().calls(), 4);
}
