//! The batch abstraction and the result type scrape functions return.

use std::collections::VecDeque;

use crate::error::{BoxError, ScrapeError};

/// A sized collection of telemetry records.
///
/// The instrumentation layer only ever measures a batch, it never looks
/// inside or mutates it.
pub trait Batch {
    /// Number of records (log records, metric data points, ...) in the batch.
    fn record_count(&self) -> usize;
}

impl<T> Batch for Vec<T> {
    fn record_count(&self) -> usize {
        self.len()
    }
}

impl<T> Batch for VecDeque<T> {
    fn record_count(&self) -> usize {
        self.len()
    }
}

impl<T> Batch for Box<[T]> {
    fn record_count(&self) -> usize {
        self.len()
    }
}

/// Output of a single scrape: the batch plus an optional error.
///
/// The batch is always present, even on failure, mirroring a
/// `(batch, error)` pair. What the batch is worth depends on the error:
/// all of it with no error, all of it with a partial error, none of it
/// with any other error.
#[derive(Debug)]
pub struct ScrapeResult<B> {
    pub batch: B,
    pub error: Option<ScrapeError>,
}

impl<B> ScrapeResult<B> {
    /// A fully successful scrape.
    pub fn ok(batch: B) -> Self {
        Self { batch, error: None }
    }

    /// A scrape that collected `batch` but lost `failed` records.
    pub fn partial(batch: B, cause: impl Into<BoxError>, failed: usize) -> Self {
        Self {
            batch,
            error: Some(ScrapeError::partial(cause, failed)),
        }
    }

    /// A failed scrape. A partial error passed here, or wrapped by the error
    /// passed here, keeps its kind.
    ///
    /// Use [`with_error`](Self::with_error) for an `anyhow::Error`, whose
    /// boxing conversion hides the error it wraps.
    pub fn failed(batch: B, err: impl Into<BoxError>) -> Self {
        Self {
            batch,
            error: Some(ScrapeError::other(err)),
        }
    }

    /// A scrape that ended with `err`, already converted or convertible
    /// into a [`ScrapeError`].
    pub fn with_error(batch: B, err: impl Into<ScrapeError>) -> Self {
        Self {
            batch,
            error: Some(err.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_parts(self) -> (B, Option<ScrapeError>) {
        (self.batch, self.error)
    }

    /// Collapse into a `Result`, dropping the batch when there is an error.
    pub fn into_result(self) -> Result<B, ScrapeError> {
        match self.error {
            None => Ok(self.batch),
            Some(err) => Err(err),
        }
    }
}

impl<B: Default> From<Result<B, ScrapeError>> for ScrapeResult<B> {
    fn from(result: Result<B, ScrapeError>) -> Self {
        match result {
            Ok(batch) => Self::ok(batch),
            Err(err) => Self {
                batch: B::default(),
                error: Some(err),
            },
        }
    }
}
