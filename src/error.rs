//! Error types returned by scrape functions and by the instrumentation layer.
//!
//! A scrape function reports one of three things:
//! - nothing (the whole batch was collected)
//! - a [`PartialScrapeError`] (the batch holds the records that made it, a
//!   known number did not)
//! - any other error (nothing in the batch can be trusted)
//!
//! A partial error keeps its kind when wrapped: an error whose source chain
//! holds a [`PartialScrapeError`] anywhere is a partial failure, reported
//! under the outermost error's message.

use std::error::Error as StdError;

use opentelemetry::metrics::MetricsError;
use opentelemetry::trace::TraceError;

/// Type-erased error produced by user scrape code.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error that lost some, but not all, records of a batch.
///
/// Only the number of failed records is carried. The records that were
/// collected travel in the batch returned next to this error.
#[derive(Debug, thiserror::Error)]
#[error("{cause}")]
pub struct PartialScrapeError {
    #[source]
    cause: BoxError,
    failed: usize,
}

impl PartialScrapeError {
    /// Wrap `cause`, reporting `failed` records that could not be collected.
    pub fn new(cause: impl Into<BoxError>, failed: usize) -> Self {
        Self {
            cause: cause.into(),
            failed,
        }
    }

    /// Number of records that failed to be collected.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// The underlying error.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}

/// Error half of a scrape result.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Some records were collected, `failed()` were not.
    #[error("{0}")]
    Partial(#[from] PartialScrapeError),

    /// Any other error. Unless a partial error sits in its source chain, the
    /// accompanying batch is not trusted.
    #[error("{0}")]
    Failed(#[source] BoxError),
}

impl ScrapeError {
    /// Shorthand for [`ScrapeError::Partial`].
    pub fn partial(cause: impl Into<BoxError>, failed: usize) -> Self {
        Self::Partial(PartialScrapeError::new(cause, failed))
    }

    /// Wrap any error as a total failure, unless it already is a boxed
    /// [`PartialScrapeError`] or [`ScrapeError`].
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::from(err.into())
    }

    pub fn is_partial(&self) -> bool {
        self.as_partial().is_some()
    }

    /// The first partial error in the source chain, if any.
    pub fn as_partial(&self) -> Option<&PartialScrapeError> {
        match self {
            Self::Partial(partial) => Some(partial),
            Self::Failed(_) => self.find_cause::<PartialScrapeError>(),
        }
    }

    /// Walk the source chain looking for an error of type `E`.
    ///
    /// The chain starts at `self`, so `find_cause::<PartialScrapeError>()`
    /// and `find_cause::<MyError>()` can be asked independently of each other.
    pub fn find_cause<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        let mut current = Some(self as &(dyn StdError + 'static));
        while let Some(err) = current {
            if let Some(found) = err.downcast_ref::<E>() {
                return Some(found);
            }
            current = err.source();
        }
        None
    }

    /// Whether an error of type `E` appears anywhere in the chain.
    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.find_cause::<E>().is_some()
    }
}

impl From<BoxError> for ScrapeError {
    fn from(err: BoxError) -> Self {
        let err = match err.downcast::<ScrapeError>() {
            Ok(scrape_err) => return *scrape_err,
            Err(err) => err,
        };
        match err.downcast::<PartialScrapeError>() {
            Ok(partial) => Self::Partial(*partial),
            Err(err) => Self::Failed(err),
        }
    }
}

impl From<anyhow::Error> for ScrapeError {
    fn from(err: anyhow::Error) -> Self {
        // The plain boxing conversion hides the wrapped type from downcasts.
        Self::from(err.reallocate_into_boxed_dyn_error_without_backtrace())
    }
}

/// Failures while wiring telemetry, not while scraping.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("failed to create instrument {name}: {source}")]
    Instrument {
        name: &'static str,
        #[source]
        source: MetricsError,
    },

    #[error("metrics pipeline error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("trace pipeline error: {0}")]
    Trace(#[from] TraceError),
}
