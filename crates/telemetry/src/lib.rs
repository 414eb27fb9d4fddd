//! Telemetry for the market ingestion engine.
//!
//! Structured logs go through `tracing`; ingestion counters are kept in
//! process and written to the log as snapshots.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
