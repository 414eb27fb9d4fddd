//! SQLite connection wrapper.

use crate::config::StoreConfig;
use engine_core::PersistenceError;
use rusqlite::Connection;
use std::time::Duration;
use tracing::info;

/// Exclusively owned connection to the local market store.
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    /// Opens (creating if needed) the database file named by `config`.
    pub fn open(config: StoreConfig) -> Result<Self, PersistenceError> {
        let open_error = |e: rusqlite::Error| PersistenceError::Open {
            path: config.path.display().to_string(),
            message: e.to_string(),
        };

        let conn = Connection::open(&config.path).map_err(open_error)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(open_error)?;

        info!(path = %config.path.display(), "Opened market store");

        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory().map_err(|e| PersistenceError::Open {
            path: ":memory:".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { conn })
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
