//! In-process ingestion metrics.
//!
//! Counters are updated by the pipeline and periodically logged as a snapshot
//! by the scheduler.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 10ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s, 30s, 60s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [10, 50, 100, 250, 500, 1000, 2500, 5000, 10000, 30000, 60000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the ingestion engine.
#[derive(Debug, Default)]
pub struct Metrics {
    // Per-date outcomes
    pub dates_attempted: Counter,
    pub dates_succeeded: Counter,
    pub dates_failed: Counter,

    // Per-row outcomes
    pub rows_inserted: Counter,
    pub rows_failed: Counter,

    // Failures by stage
    pub fetch_errors: Counter,
    pub decode_errors: Counter,
    pub persistence_errors: Counter,

    // Latency histograms
    pub fetch_latency_ms: Histogram,
    pub ingest_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub dates_attempted: u64,
    pub dates_succeeded: u64,
    pub dates_failed: u64,
    pub rows_inserted: u64,
    pub rows_failed: u64,
    pub fetch_errors: u64,
    pub decode_errors: u64,
    pub persistence_errors: u64,
    pub fetch_latency_mean_ms: f64,
    pub ingest_latency_mean_ms: f64,
    /// `(upper bound ms, count)` per bucket
    pub ingest_latency_buckets: Vec<(u64, u64)>,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            dates_attempted: self.dates_attempted.get(),
            dates_succeeded: self.dates_succeeded.get(),
            dates_failed: self.dates_failed.get(),
            rows_inserted: self.rows_inserted.get(),
            rows_failed: self.rows_failed.get(),
            fetch_errors: self.fetch_errors.get(),
            decode_errors: self.decode_errors.get(),
            persistence_errors: self.persistence_errors.get(),
            fetch_latency_mean_ms: self.fetch_latency_ms.mean(),
            ingest_latency_mean_ms: self.ingest_latency_ms.mean(),
            ingest_latency_buckets: self.ingest_latency_ms.buckets(),
        }
    }
}

/// Writes a snapshot to the log as one structured line.
pub fn log_snapshot(snapshot: &MetricsSnapshot) {
    info!(
        dates_attempted = snapshot.dates_attempted,
        dates_succeeded = snapshot.dates_succeeded,
        dates_failed = snapshot.dates_failed,
        rows_inserted = snapshot.rows_inserted,
        rows_failed = snapshot.rows_failed,
        fetch_errors = snapshot.fetch_errors,
        decode_errors = snapshot.decode_errors,
        persistence_errors = snapshot.persistence_errors,
        fetch_latency_mean_ms = snapshot.fetch_latency_mean_ms,
        ingest_latency_mean_ms = snapshot.ingest_latency_mean_ms,
        ingest_latency_buckets = ?snapshot.ingest_latency_buckets,
        "Ingestion metrics"
    );
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
