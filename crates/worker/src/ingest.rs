//! Single-date ingestion pipeline.
//!
//! For one calendar date:
//! 1. Fetch the raw file from the source
//! 2. Decompress it (zip archive or gzip stream)
//! 3. Ensure the store schema
//! 4. Parse rows and upsert them in one transaction
//!
//! A failure at any stage aborts that date only. Rows that cannot be read,
//! converted or written are counted and skipped.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use engine_core::{parse, IngestError, Result, RowPolicy, Stage};
use market_source::{DecoderChain, MarketSource};
use market_store::Store;
use telemetry::metrics;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Outcome of one successful date ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionResult {
    pub date: NaiveDate,
    pub inserted_count: usize,
    pub error_count: usize,
    /// Inner file name reported by the decoder.
    pub file_name: String,
}

/// Runs fetch → decompress → store for one date at a time.
pub struct Ingestor {
    source: Arc<dyn MarketSource>,
    decoders: DecoderChain,
    store: Store,
    policy: RowPolicy,
}

impl Ingestor {
    /// Creates an ingestor with the default decoder chain and row policy.
    pub fn new(source: Arc<dyn MarketSource>, store: Store) -> Self {
        Self {
            source,
            decoders: DecoderChain::default(),
            store,
            policy: RowPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_decoders(mut self, decoders: DecoderChain) -> Self {
        self.decoders = decoders;
        self
    }

    /// Returns the store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Ingests the file published for `date`.
    pub async fn ingest(&mut self, date: NaiveDate) -> Result<IngestionResult> {
        let span = info_span!("ingest", date = %date, run_id = %Uuid::new_v4());

        async {
            let start = Instant::now();
            metrics().dates_attempted.inc();

            let result = self.run_stages(date).await;
            metrics()
                .ingest_latency_ms
                .observe(start.elapsed().as_millis() as u64);

            match &result {
                Ok(outcome) => {
                    metrics().dates_succeeded.inc();
                    metrics().rows_inserted.inc_by(outcome.inserted_count as u64);
                    metrics().rows_failed.inc_by(outcome.error_count as u64);
                }
                Err(e) => {
                    metrics().dates_failed.inc();
                    match e.stage() {
                        Stage::Fetch => metrics().fetch_errors.inc(),
                        Stage::Decode => metrics().decode_errors.inc(),
                        Stage::Persist => metrics().persistence_errors.inc(),
                    }
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&mut self, date: NaiveDate) -> Result<IngestionResult> {
        info!("Processing market data");

        let fetched = self
            .source
            .fetch(date)
            .await
            .map_err(|e| IngestError::fetch(date, e))?;

        let payload = self
            .decoders
            .decompress(&fetched.bytes, date)
            .map_err(|e| IngestError::decode(date, e))?;

        info!(
            source = %fetched.label,
            file = %payload.name,
            format = payload.format,
            bytes = payload.bytes.len(),
            "Payload extracted"
        );

        self.store
            .ensure_schema()
            .map_err(|e| IngestError::persistence(date, e))?;

        let policy = self.policy;
        let mut row_errors = 0usize;
        let records = parse(&payload.bytes).filter_map(|row| {
            match row.and_then(|raw| policy.convert(&raw, date)) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping row");
                    row_errors += 1;
                    None
                }
            }
        });

        let outcome = self
            .store
            .upsert_batch(records)
            .map_err(|e| IngestError::persistence(date, e))?;

        let result = IngestionResult {
            date,
            inserted_count: outcome.inserted,
            error_count: row_errors + outcome.errors,
            file_name: payload.name,
        };

        let stored = self
            .store
            .count_for_date(date)
            .map_err(|e| warn!(error = %e, "Could not count stored rows"))
            .ok();

        info!(
            records = result.inserted_count,
            errors = result.error_count,
            stored = ?stored,
            file = %result.file_name,
            "Data inserted"
        );

        Ok(result)
    }
}
