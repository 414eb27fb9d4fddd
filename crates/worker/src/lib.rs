//! Ingestion workers.
//!
//! - Ingest (fetch → decompress → store for one date)
//! - Backfill (sequential ingestion over a date range)
//! - Scheduler (daily trigger in a fixed timezone)

pub mod backfill;
pub mod config;
pub mod ingest;
pub mod scheduler;

pub use backfill::{BackfillResult, BackfillWorker, DateRange, FailedDate};
pub use config::{IngestConfig, ScheduleConfig, ScheduleError};
pub use ingest::{IngestionResult, Ingestor};
pub use scheduler::{next_trigger, Mode, Scheduler};
