//! Transactional batch upsert.

use crate::client::Store;
use engine_core::{MarketRecord, PersistenceError, RowError};
use rusqlite::params;
use std::time::Instant;
use tracing::{debug, warn};

/// Insert-or-replace keyed on the `(date, symbol)` unique constraint.
pub const UPSERT_MARKET_DATA: &str = r#"
INSERT OR REPLACE INTO market_data
    (date, symbol, code, company_name, open, high, low, close, volume, previous_close)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
"#;

/// Counts from one committed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub inserted: usize,
    pub errors: usize,
}

impl Store {
    /// Writes `records` in a single transaction.
    ///
    /// A row whose statement fails is counted in `errors` and the batch goes
    /// on. Failing to begin, prepare or commit aborts the whole batch and
    /// nothing from it is kept.
    pub fn upsert_batch<I>(&mut self, records: I) -> Result<BatchOutcome, PersistenceError>
    where
        I: IntoIterator<Item = MarketRecord>,
    {
        let start = Instant::now();
        let mut outcome = BatchOutcome::default();

        let tx = self
            .conn
            .transaction()
            .map_err(|e| PersistenceError::Begin(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(UPSERT_MARKET_DATA)
                .map_err(|e| PersistenceError::Prepare(e.to_string()))?;

            for record in records {
                let written = stmt.execute(params![
                    record.canonical_date(),
                    record.symbol,
                    record.code,
                    record.company_name,
                    record.open,
                    record.high,
                    record.low,
                    record.close,
                    record.volume,
                    record.previous_close,
                ]);

                match written {
                    Ok(_) => outcome.inserted += 1,
                    Err(e) => {
                        let err = RowError::Write {
                            date: record.date,
                            symbol: record.symbol,
                            message: e.to_string(),
                        };
                        warn!(error = %err, "Skipping row");
                        outcome.errors += 1;
                    }
                }
            }
        }

        tx.commit()
            .map_err(|e| PersistenceError::Commit(e.to_string()))?;

        debug!(
            inserted = outcome.inserted,
            errors = outcome.errors,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch committed"
        );

        Ok(outcome)
    }
}
