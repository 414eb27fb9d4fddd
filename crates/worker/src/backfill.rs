//! Backfill over an explicit range of past dates.

use chrono::NaiveDate;
use engine_core::{parse_canonical_date, RangeError};
use tracing::{error, info};

use crate::ingest::{IngestionResult, Ingestor};

/// Inclusive range of calendar dates, start never after end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses `YYYY-MM-DD` bounds. A missing end defaults to `today`.
    pub fn parse(start: &str, end: Option<&str>, today: NaiveDate) -> Result<Self, RangeError> {
        let start = parse_canonical_date("start", start)?;
        let end = match end {
            Some(raw) => parse_canonical_date("end", raw)?,
            None => today,
        };
        Self::new(start, end)
    }

    /// Resolves optional CLI bounds. Backfill runs only when a start is
    /// given; a lone end is still validated but selects nothing.
    pub fn from_bounds(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Option<Self>, RangeError> {
        match (start, end) {
            (Some(start), end) => Self::parse(start, end, today).map(Some),
            (None, Some(end)) => parse_canonical_date("end", end).map(|_| None),
            (None, None) => Ok(None),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of dates in the range.
    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every date from start to end, inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// A date that failed during backfill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDate {
    pub date: NaiveDate,
    pub code: &'static str,
    pub message: String,
}

/// Result of a backfill run.
#[derive(Debug, Default)]
pub struct BackfillResult {
    pub succeeded: Vec<IngestionResult>,
    pub failed: Vec<FailedDate>,
}

impl BackfillResult {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn records_inserted(&self) -> usize {
        self.succeeded.iter().map(|r| r.inserted_count).sum()
    }
}

/// Worker that ingests every date in a range, one after another.
pub struct BackfillWorker {
    range: DateRange,
}

impl BackfillWorker {
    pub fn new(range: DateRange) -> Self {
        Self { range }
    }

    /// Ingests each date in order. Failed dates are logged and skipped.
    pub async fn run(&self, ingestor: &mut Ingestor) -> BackfillResult {
        info!(
            from = %self.range.start(),
            to = %self.range.end(),
            days = self.range.day_count(),
            "Starting backload"
        );

        let mut result = BackfillResult::default();

        for date in self.range.days() {
            info!(date = %date, "Backloading");

            match ingestor.ingest(date).await {
                Ok(outcome) => {
                    info!(
                        date = %date,
                        records = outcome.inserted_count,
                        errors = outcome.error_count,
                        "Backload successful"
                    );
                    result.succeeded.push(outcome);
                }
                Err(e) => {
                    error!(date = %date, code = e.code(), error = %e, "Backload failed");
                    result.failed.push(FailedDate {
                        date,
                        code: e.code(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            attempted = result.attempted(),
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            records = result.records_inserted(),
            "Backload completed"
        );

        result
    }
}
