//! Shared helpers for the ingestion integration tests.

pub mod fixtures;
pub mod setup;
