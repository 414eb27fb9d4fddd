//! Test fixtures and payload generators.

use std::io::{Cursor, Write};

use chrono::NaiveDate;
use flate2::{Compression, GzBuilder};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A well-formed summary row for Acme Corp on 2024-01-01.
pub const ACME_ROW: &str = "01Jan2024|AAA|001|Acme Corp|10|12|9|11|1000|9.5";

/// A row with too few fields.
pub const SHORT_ROW: &str = "01Jan2024|BBB|002";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Joins rows into a newline-terminated payload.
pub fn lines(rows: &[&str]) -> Vec<u8> {
    let mut text = rows.join("\n");
    text.push('\n');
    text.into_bytes()
}

/// One good row and one short row.
pub fn mixed_payload() -> Vec<u8> {
    lines(&[ACME_ROW, SHORT_ROW])
}

/// A full row for `symbol` on `date`, with the given close and volume.
pub fn row(date: NaiveDate, symbol: &str, close: f64, volume: i64) -> String {
    format!(
        "{}|{symbol}|100|{symbol} Holdings|{close}|{close}|{close}|{close}|{volume}|{close}",
        date.format("%d%b%Y")
    )
}

/// Wraps `contents` as the only entry of a zip archive.
pub fn zip_payload(name: &str, contents: &[u8]) -> Vec<u8> {
    zip_entries(&[(name, contents)])
}

/// Builds a zip archive holding the entries in order.
pub fn zip_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Wraps `contents` in a gzip stream with an embedded file name.
pub fn gzip_payload(name: &str, contents: &[u8]) -> Vec<u8> {
    let mut encoder = GzBuilder::new()
        .filename(name)
        .write(Vec::new(), Compression::default());
    encoder.write_all(contents).unwrap();
    encoder.finish().unwrap()
}
