//! Pipe-delimited market summary reader.
//!
//! Rows are produced lazily in file order from a single forward pass over the
//! payload. Field counts are not enforced here; see [`crate::RowPolicy`].

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};

use crate::error::RowError;

/// Field delimiter used by the market summary files.
pub const DELIMITER: u8 = b'|';

/// One tokenized line of the payload.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based index of the row in the payload.
    pub line: u64,
    pub fields: StringRecord,
}

impl RawRow {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the trimmed field at `index`, or an empty string when absent.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(str::trim).unwrap_or("")
    }
}

/// Lazy row iterator over a decompressed payload.
pub struct RowReader<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    line: u64,
}

/// Starts reading rows from `payload`.
pub fn parse(payload: &[u8]) -> RowReader<'_> {
    let reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(payload);

    RowReader {
        records: reader.into_records(),
        line: 0,
    }
}

impl Iterator for RowReader<'_> {
    type Item = Result<RawRow, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.records.next()?;
        self.line += 1;
        let line = self.line;

        Some(match result {
            Ok(fields) => Ok(RawRow { line, fields }),
            Err(e) => Err(RowError::Malformed {
                line,
                message: e.to_string(),
            }),
        })
    }
}
