//! Error taxonomy for the ingestion engine.
//!
//! Error codes (stage level, reported per date):
//! - FETCH_001: Remote source unreachable or returned a non-success status
//! - DECODE_001: Payload framing not recognized or unreadable
//! - STORE_001: Batch transaction could not be opened or committed
//!
//! Row level errors never carry a code. They are counted and logged inside
//! the batch and never propagate past it.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for a single date's ingestion.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Pipeline stage that produced an [`IngestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// FETCH_001
    Fetch,
    /// DECODE_001
    Decode,
    /// STORE_001
    Persist,
}

impl Stage {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fetch => "FETCH_001",
            Self::Decode => "DECODE_001",
            Self::Persist => "STORE_001",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Decode => "decode",
            Self::Persist => "persist",
        }
    }
}

/// Failure to retrieve a day's file from the remote source.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("invalid source url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed reading response body from {url}: {message}")]
    Body { url: String, message: String },
}

/// Failure to unwrap the compression framing of a fetched payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("file is neither a valid zip archive nor a gzip stream")]
    UnsupportedFormat,

    #[error("no files found in zip archive")]
    EmptyArchive,

    #[error("failed reading {format} payload: {message}")]
    Corrupt {
        format: &'static str,
        message: String,
    },
}

/// A single row that could not be read, converted or written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("line {line}: expected at least {required} fields, found {found}")]
    TooFewFields {
        line: u64,
        found: usize,
        required: usize,
    },

    #[error("line {line}: unreadable row: {message}")]
    Malformed { line: u64, message: String },

    #[error("line {line}: invalid date {value:?}")]
    InvalidDate { line: u64, value: String },

    #[error("{date}/{symbol}: write failed: {message}")]
    Write {
        date: NaiveDate,
        symbol: String,
        message: String,
    },
}

/// Store failure that aborts a whole batch.
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("failed to open database {path}: {message}")]
    Open { path: String, message: String },

    #[error("failed creating table: {0}")]
    Schema(String),

    #[error("transaction start failed: {0}")]
    Begin(String),

    #[error("statement preparation failed: {0}")]
    Prepare(String),

    #[error("transaction commit failed: {0}")]
    Commit(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Invalid backfill input. Fatal at startup only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid {field} date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Failure of one date's ingestion, annotated with the date.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("[FETCH_001] {date}: data download failed: {source}")]
    Fetch {
        date: NaiveDate,
        source: TransportError,
    },

    #[error("[DECODE_001] {date}: data extraction failed: {source}")]
    Decode { date: NaiveDate, source: DecodeError },

    #[error("[STORE_001] {date}: {source}")]
    Persistence {
        date: NaiveDate,
        source: PersistenceError,
    },
}

impl IngestError {
    pub fn fetch(date: NaiveDate, source: TransportError) -> Self {
        Self::Fetch { date, source }
    }

    pub fn decode(date: NaiveDate, source: DecodeError) -> Self {
        Self::Decode { date, source }
    }

    pub fn persistence(date: NaiveDate, source: PersistenceError) -> Self {
        Self::Persistence { date, source }
    }

    /// The date whose ingestion failed.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Fetch { date, .. } | Self::Decode { date, .. } | Self::Persistence { date, .. } => {
                *date
            }
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Fetch { .. } => Stage::Fetch,
            Self::Decode { .. } => Stage::Decode,
            Self::Persistence { .. } => Stage::Persist,
        }
    }

    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        self.stage().code()
    }
}
