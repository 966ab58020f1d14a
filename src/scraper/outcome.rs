//! Classification of a scrape result into an outcome and record counts.

use std::fmt;

use crate::batch::{Batch, ScrapeResult};
use crate::error::ScrapeError;

/// What a single scrape achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeOutcome {
    /// No error; every record in the batch counts.
    Success,
    /// A partial error; the batch counts and so do the failed records.
    PartialFailure,
    /// Any other error; nothing counts.
    TotalFailure,
}

impl ScrapeOutcome {
    pub fn is_error(self) -> bool {
        !matches!(self, ScrapeOutcome::Success)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScrapeOutcome::Success => "success",
            ScrapeOutcome::PartialFailure => "partial_failure",
            ScrapeOutcome::TotalFailure => "total_failure",
        }
    }
}

impl fmt::Display for ScrapeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record counts attributed to one scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrapeCounts {
    pub scraped: u64,
    pub errored: u64,
}

/// Outcome plus the counts it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub outcome: ScrapeOutcome,
    pub counts: ScrapeCounts,
}

/// Classify a batch and the error returned next to it.
///
/// A partial error anywhere in the error's source chain makes the scrape a
/// partial failure. The kind of error decides the outcome, never the counts:
/// a partial error reporting zero failed records is still a
/// [`ScrapeOutcome::PartialFailure`].
/// The batch next to a partial error is taken to hold only collected records;
/// its size is not checked against the failed count.
pub fn classify<B: Batch + ?Sized>(batch: &B, error: Option<&ScrapeError>) -> Classification {
    match error {
        None => Classification {
            outcome: ScrapeOutcome::Success,
            counts: ScrapeCounts {
                scraped: batch.record_count() as u64,
                errored: 0,
            },
        },
        Some(err) => match err.as_partial() {
            Some(partial) => Classification {
                outcome: ScrapeOutcome::PartialFailure,
                counts: ScrapeCounts {
                    scraped: batch.record_count() as u64,
                    errored: partial.failed() as u64,
                },
            },
            None => Classification {
                outcome: ScrapeOutcome::TotalFailure,
                counts: ScrapeCounts::default(),
            },
        },
    }
}

impl<B: Batch> ScrapeResult<B> {
    /// Classify this result. Pure; repeated calls agree.
    pub fn classify(&self) -> Classification {
        classify(&self.batch, self.error.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_counts_whole_batch() {
        let result = ScrapeResult::ok(vec![(); 15]);
        let c = result.classify();
        assert_eq!(c.outcome, ScrapeOutcome::Success);
        assert_eq!(c.counts, ScrapeCounts { scraped: 15, errored: 0 });
        assert!(!c.outcome.is_error());
    }

    #[test]
    fn test_partial_counts_batch_and_failed() {
        let result = ScrapeResult::partial(vec![(); 23], "two records lost", 2);
        let c = result.classify();
        assert_eq!(c.outcome, ScrapeOutcome::PartialFailure);
        assert_eq!(c.counts, ScrapeCounts { scraped: 23, errored: 2 });
    }

    #[test]
    fn test_partial_with_zero_failed_is_still_partial() {
        let result = ScrapeResult::partial(Vec::<u8>::new(), "nothing lost", 0);
        let c = result.classify();
        assert_eq!(c.outcome, ScrapeOutcome::PartialFailure);
        assert!(c.outcome.is_error());
        assert_eq!(c.counts, ScrapeCounts::default());
    }

    #[test]
    fn test_total_failure_ignores_batch() {
        let result = ScrapeResult::failed(vec![(); 29], "connection refused");
        let c = result.classify();
        assert_eq!(c.outcome, ScrapeOutcome::TotalFailure);
        assert_eq!(c.counts, ScrapeCounts::default());
    }

    #[derive(Debug, thiserror::Error)]
    #[error("export interrupted")]
    struct Interrupted(#[source] crate::error::PartialScrapeError);

    #[test]
    fn test_wrapped_partial_is_partial_failure() {
        let cause = crate::error::PartialScrapeError::new("socket closed", 3);
        let result = ScrapeResult::failed(vec![(); 11], Interrupted(cause));
        let c = result.classify();
        assert_eq!(c.outcome, ScrapeOutcome::PartialFailure);
        assert_eq!(c.counts, ScrapeCounts { scraped: 11, errored: 3 });
    }

    #[test]
    fn test_classification_is_repeatable() {
        let result = ScrapeResult::partial(vec![1, 2, 3], "flaky", 7);
        assert_eq!(result.classify(), result.classify());
        assert_eq!(result.classify().outcome.to_string(), "partial_failure");
    }
}
