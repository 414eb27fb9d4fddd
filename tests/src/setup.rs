//! Common test setup functions.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use engine_core::Result;
use market_store::{Store, StoreConfig};
use tempfile::TempDir;
use worker::{IngestionResult, Ingestor};

use crate::mocks::MockSource;

/// Test context with a mock source and a real SQLite file.
///
/// Runs the production `Ingestor` end to end:
/// - `MockSource` implements `MarketSource` and records every fetch
/// - the store is a fresh database file in a temporary directory
pub struct TestContext {
    pub source: MockSource,
    pub ingestor: Ingestor,
    db_path: PathBuf,
    // Dropped last so the database file outlives the connection.
    _dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("market_data.db");

        let store = Store::open(StoreConfig {
            path: db_path.clone(),
            ..StoreConfig::default()
        })
        .expect("Failed to open store");

        let source = MockSource::new();
        let ingestor = Ingestor::new(Arc::new(source.clone()), store);

        Self {
            source,
            ingestor,
            db_path,
            _dir: dir,
        }
    }

    /// Serves `bytes` as the file for `date`.
    pub fn serve(&self, date: NaiveDate, bytes: Vec<u8>) {
        self.source.insert(date, bytes);
    }

    pub async fn ingest(&mut self, date: NaiveDate) -> Result<IngestionResult> {
        self.ingestor.ingest(date).await
    }

    pub fn store(&self) -> &Store {
        self.ingestor.store()
    }

    /// Path of the database file.
    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Rows in the table with the given `(date, symbol)` text key.
    pub fn rows_for_key(&self, date: &str, symbol: &str) -> i64 {
        self.store()
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM market_data WHERE date = ?1 AND symbol = ?2",
                [date, symbol],
                |row| row.get(0),
            )
            .expect("Count query failed")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
