//! Read queries against the market store.

use crate::client::Store;
use chrono::NaiveDate;
use engine_core::{canonical_date, MarketRecord, PersistenceError, CANONICAL_DATE_FORMAT};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

fn query_error(e: rusqlite::Error) -> PersistenceError {
    PersistenceError::Query(e.to_string())
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, CANONICAL_DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl Store {
    /// Number of rows stored for `date`.
    pub fn count_for_date(&self, date: NaiveDate) -> Result<u64, PersistenceError> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM market_data WHERE date = ?1",
                params![canonical_date(date)],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n as u64)
            .map_err(query_error)
    }

    /// Total number of rows in the store.
    pub fn total_rows(&self) -> Result<u64, PersistenceError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM market_data", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as u64)
            .map_err(query_error)
    }

    /// Fetches one instrument's summary for one date.
    pub fn get(
        &self,
        date: NaiveDate,
        symbol: &str,
    ) -> Result<Option<MarketRecord>, PersistenceError> {
        self.conn
            .query_row(
                r#"
                SELECT date, symbol, code, company_name, open, high, low, close,
                       volume, previous_close
                FROM market_data
                WHERE date = ?1 AND symbol = ?2
                "#,
                params![canonical_date(date), symbol],
                |row| {
                    Ok(MarketRecord {
                        date: date_column(row, 0)?,
                        symbol: row.get(1)?,
                        code: row.get(2)?,
                        company_name: row.get(3)?,
                        open: row.get(4)?,
                        high: row.get(5)?,
                        low: row.get(6)?,
                        close: row.get(7)?,
                        volume: row.get(8)?,
                        previous_close: row.get(9)?,
                    })
                },
            )
            .optional()
            .map_err(query_error)
    }

    /// Distinct stored dates, ascending.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, PersistenceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT date FROM market_data ORDER BY date")
            .map_err(query_error)?;

        let dates = stmt
            .query_map([], |row| date_column(row, 0))
            .map_err(query_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(query_error)?;

        Ok(dates)
    }
}
