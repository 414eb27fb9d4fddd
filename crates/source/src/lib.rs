//! Remote market summary source for the ingestion engine.
//!
//! - `client`: one GET per date against a templated URL
//! - `decode`: ordered decoder chain (zip archive, then gzip stream)

pub mod client;
pub mod config;
pub mod decode;

pub use client::*;
pub use config::*;
pub use decode::{decompress, Decoder, DecoderChain, GzipDecoder, Payload, ZipDecoder};
