//! Core types, row parsing, and error taxonomy for the market ingestion engine.

pub mod error;
pub mod parser;
pub mod record;

pub use error::*;
pub use parser::{parse, RawRow, RowReader};
pub use record::*;
