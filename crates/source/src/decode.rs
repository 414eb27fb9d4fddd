//! Payload framing detection.
//!
//! The source publishes the same logical file either as a zip archive or as a
//! gzip stream, with no extension telling them apart. Decoders are tried in
//! order and the first one that recognizes the framing wins.

use std::io::{Cursor, Read};

use chrono::NaiveDate;
use engine_core::{canonical_date, DecodeError};
use flate2::read::MultiGzDecoder;
use tracing::debug;
use zip::ZipArchive;

/// End of central directory signature, the first bytes of an entry-less zip.
const EMPTY_ARCHIVE_SIGNATURE: &[u8] = b"PK\x05\x06";

/// Upper bound on the buffer reserved from a zip entry's declared size.
const MAX_PREALLOC: u64 = 64 << 20;

/// Decompressed file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub bytes: Vec<u8>,
    /// Best-effort inner file name.
    pub name: String,
    /// Name of the decoder that produced the payload.
    pub format: &'static str,
}

/// A candidate framing.
pub trait Decoder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `Ok(None)` when `raw` is not in this decoder's framing, and an
    /// error when it is but cannot be read.
    fn try_decode(&self, raw: &[u8], date: NaiveDate) -> Result<Option<Payload>, DecodeError>;
}

/// Zip container: the first entry in listing order is the payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipDecoder;

impl Decoder for ZipDecoder {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn try_decode(&self, raw: &[u8], _date: NaiveDate) -> Result<Option<Payload>, DecodeError> {
        let mut archive = match ZipArchive::new(Cursor::new(raw)) {
            Ok(archive) => archive,
            // An archive with no entries is nothing but its end record.
            Err(_) if raw.starts_with(EMPTY_ARCHIVE_SIGNATURE) => {
                return Err(DecodeError::EmptyArchive)
            }
            Err(_) => return Ok(None),
        };

        if archive.len() == 0 {
            return Err(DecodeError::EmptyArchive);
        }

        let corrupt = |message: String| DecodeError::Corrupt {
            format: "zip",
            message,
        };

        let mut entry = archive
            .by_index(0)
            .map_err(|e| corrupt(format!("failed opening zip file: {}", e)))?;
        let name = entry.name().to_string();

        let mut bytes = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| corrupt(format!("failed reading zip file: {}", e)))?;

        Ok(Some(Payload {
            bytes,
            name,
            format: self.name(),
        }))
    }
}

/// Gzip stream, using the embedded file name when present.
#[derive(Debug, Default, Clone, Copy)]
pub struct GzipDecoder;

impl Decoder for GzipDecoder {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn try_decode(&self, raw: &[u8], date: NaiveDate) -> Result<Option<Payload>, DecodeError> {
        let mut decoder = MultiGzDecoder::new(raw);
        let mut bytes = Vec::new();

        if let Err(e) = decoder.read_to_end(&mut bytes) {
            // No parsed header means the bytes were never gzip to begin with.
            if decoder.header().is_none() {
                return Ok(None);
            }
            return Err(DecodeError::Corrupt {
                format: "gzip",
                message: format!("failed reading gzip file: {}", e),
            });
        }

        let Some(header) = decoder.header() else {
            return Ok(None);
        };

        let name = header
            .filename()
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{}_decompressed", canonical_date(date)));

        Ok(Some(Payload {
            bytes,
            name,
            format: self.name(),
        }))
    }
}

/// Ordered list of candidate decoders.
pub struct DecoderChain {
    decoders: Vec<Box<dyn Decoder>>,
}

impl Default for DecoderChain {
    fn default() -> Self {
        Self::new(vec![Box::new(ZipDecoder), Box::new(GzipDecoder)])
    }
}

impl DecoderChain {
    pub fn new(decoders: Vec<Box<dyn Decoder>>) -> Self {
        Self { decoders }
    }

    /// Names of the decoders in trial order.
    pub fn formats(&self) -> Vec<&'static str> {
        self.decoders.iter().map(|d| d.name()).collect()
    }

    /// Decompresses `raw` with the first decoder that recognizes it.
    pub fn decompress(&self, raw: &[u8], date: NaiveDate) -> Result<Payload, DecodeError> {
        for decoder in &self.decoders {
            if let Some(payload) = decoder.try_decode(raw, date)? {
                debug!(
                    format = payload.format,
                    file = %payload.name,
                    bytes = payload.bytes.len(),
                    "Payload decompressed"
                );
                return Ok(payload);
            }
        }

        Err(DecodeError::UnsupportedFormat)
    }
}

/// Decompresses with the default zip-then-gzip chain.
pub fn decompress(raw: &[u8], date: NaiveDate) -> Result<Payload, DecodeError> {
    DecoderChain::default().decompress(raw, date)
}
