//! Market store schema.

use crate::client::Store;
use engine_core::PersistenceError;
use tracing::debug;

/// Name of the single table holding daily summaries.
pub const MARKET_DATA_TABLE: &str = "market_data";

/// SQL for creating the market data table.
///
/// One row per instrument per trading date. `(date, symbol)` is the upsert key.
pub const CREATE_MARKET_DATA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS market_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT,
    symbol TEXT,
    code TEXT,
    company_name TEXT,
    open REAL,
    high REAL,
    low REAL,
    close REAL,
    volume INTEGER,
    previous_close REAL,
    UNIQUE(date, symbol)
);
"#;

impl Store {
    /// Creates the market data table if it does not exist yet.
    pub fn ensure_schema(&self) -> Result<(), PersistenceError> {
        self.conn
            .execute_batch(CREATE_MARKET_DATA_TABLE)
            .map_err(|e| PersistenceError::Schema(e.to_string()))?;

        debug!(table = MARKET_DATA_TABLE, "Market store schema ready");
        Ok(())
    }
}
