//! Store health checks.

use crate::client::Store;
use tracing::{debug, error};

/// Check that the store answers a trivial query.
pub fn check_connection(store: &Store) -> bool {
    match store
        .connection()
        .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
    {
        Ok(_) => {
            debug!("Market store connection healthy");
            true
        }
        Err(e) => {
            error!("Market store health check failed: {}", e);
            false
        }
    }
}
