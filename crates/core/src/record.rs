//! Market summary record and row conversion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RangeError, RowError};
use crate::parser::RawRow;

/// Canonical date form used as the store's key component.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Day-month-year form used inside the source files (`01Jan2024`).
pub const NATIVE_DATE_FORMAT: &str = "%d%b%Y";

/// Minimum number of fields an accepted row must carry.
pub const MIN_FIELDS: usize = 10;

/// One instrument's summary for one trading date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub code: String,
    pub company_name: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub previous_close: f64,
}

impl MarketRecord {
    /// The record's date in canonical `YYYY-MM-DD` form.
    pub fn canonical_date(&self) -> String {
        canonical_date(self.date)
    }
}

/// Formats a date in canonical `YYYY-MM-DD` form.
pub fn canonical_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// Parses a user supplied `YYYY-MM-DD` date. `field` names the input in errors.
pub fn parse_canonical_date(field: &'static str, value: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(value.trim(), CANONICAL_DATE_FORMAT).map_err(|_| {
        RangeError::InvalidDate {
            field,
            value: value.to_string(),
        }
    })
}

/// Parses a date in the source's native form. Month names are case-insensitive.
pub fn parse_native_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, NATIVE_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, CANONICAL_DATE_FORMAT))
        .ok()
}

/// Where an accepted row takes its date from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSource {
    /// The row's own first column. An empty column inherits the batch date.
    #[default]
    Row,
    /// Every row is stored under the batch date.
    Batch,
}

/// Row acceptance rules applied by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPolicy {
    pub min_fields: usize,
    pub date_source: DateSource,
}

impl Default for RowPolicy {
    fn default() -> Self {
        Self {
            min_fields: MIN_FIELDS,
            date_source: DateSource::Row,
        }
    }
}

impl RowPolicy {
    /// Converts a raw row into a record.
    ///
    /// Rows below the field threshold or with an unparsable own date are
    /// rejected. Numeric fields that fail to parse become zero and never
    /// reject the row.
    pub fn convert(&self, row: &RawRow, batch_date: NaiveDate) -> Result<MarketRecord, RowError> {
        if row.len() < self.min_fields {
            return Err(RowError::TooFewFields {
                line: row.line,
                found: row.len(),
                required: self.min_fields,
            });
        }

        let date = match self.date_source {
            DateSource::Batch => batch_date,
            DateSource::Row => match row.field(0) {
                "" => batch_date,
                raw => parse_native_date(raw).ok_or_else(|| RowError::InvalidDate {
                    line: row.line,
                    value: raw.to_string(),
                })?,
            },
        };

        Ok(MarketRecord {
            date,
            symbol: row.field(1).to_string(),
            code: row.field(2).to_string(),
            company_name: row.field(3).to_string(),
            open: parse_price(row.field(4)),
            high: parse_price(row.field(5)),
            low: parse_price(row.field(6)),
            close: parse_price(row.field(7)),
            volume: parse_volume(row.field(8)),
            previous_close: parse_price(row.field(9)),
        })
    }
}

fn parse_price(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_volume(raw: &str) -> i64 {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|v| *v >= 0)
        .unwrap_or(0)
}
