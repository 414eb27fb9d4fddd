//! End-to-end tests for the ingest pipeline.
//!
//! MockSource → decoder chain → row parser → SQLite file.
//!
//! The MockSource implements the same MarketSource trait as HttpSource, so
//! every production code path runs except the HTTP transport.

use integration_tests::{fixtures, setup::TestContext};
use market_store::{health, Store, StoreConfig};

/// Full pipeline: zip payload with one good row and one short row.
#[tokio::test]
async fn test_ingest_zip_payload_e2e() {
    let mut ctx = TestContext::new();
    let day = fixtures::date(2024, 1, 1);
    ctx.serve(
        day,
        fixtures::zip_payload("closing11.lis", &fixtures::mixed_payload()),
    );

    let result = ctx.ingest(day).await.expect("Ingestion failed");

    assert_eq!(result.inserted_count, 1);
    assert_eq!(result.error_count, 1);
    assert_eq!(result.file_name, "closing11.lis");
    assert_eq!(ctx.source.calls(), vec![day]);

    // Stored text key is the canonical date
    assert_eq!(ctx.rows_for_key("2024-01-01", "AAA"), 1);
    assert_eq!(ctx.store().total_rows().unwrap(), 1);

    let record = ctx
        .store()
        .get(day, "AAA")
        .unwrap()
        .expect("AAA should be stored");
    assert_eq!(record.canonical_date(), "2024-01-01");
    assert_eq!(record.code, "001");
    assert_eq!(record.company_name, "Acme Corp");
    assert_eq!(record.open, 10.0);
    assert_eq!(record.high, 12.0);
    assert_eq!(record.low, 9.0);
    assert_eq!(record.close, 11.0);
    assert_eq!(record.volume, 1000);
    assert_eq!(record.previous_close, 9.5);
}

/// Same flow with a gzip stream instead of a zip archive.
#[tokio::test]
async fn test_ingest_gzip_payload_e2e() {
    let mut ctx = TestContext::new();
    let day = fixtures::date(2024, 1, 1);
    ctx.serve(
        day,
        fixtures::gzip_payload("closing11.lis", &fixtures::mixed_payload()),
    );

    let result = ctx.ingest(day).await.expect("Ingestion failed");

    assert_eq!(result.inserted_count, 1);
    assert_eq!(result.error_count, 1);
    assert_eq!(result.file_name, "closing11.lis");
    assert_eq!(ctx.rows_for_key("2024-01-01", "AAA"), 1);
}

/// Ingesting the same file twice leaves the same rows.
#[tokio::test]
async fn test_reingest_is_idempotent() {
    let mut ctx = TestContext::new();
    let day = fixtures::date(2024, 3, 4);
    let rows = [
        fixtures::row(day, "AAA", 10.5, 100),
        fixtures::row(day, "BBB", 20.0, 200),
        fixtures::row(day, "CCC", 30.25, 300),
    ];
    let text = fixtures::lines(&rows.iter().map(String::as_str).collect::<Vec<_>>());
    ctx.serve(day, fixtures::zip_payload("day.lis", &text));

    let first = ctx.ingest(day).await.unwrap();
    let after_first = ctx.store().count_for_date(day).unwrap();

    let second = ctx.ingest(day).await.unwrap();
    let after_second = ctx.store().count_for_date(day).unwrap();

    assert_eq!(first.inserted_count, 3);
    assert_eq!(second.inserted_count, 3);
    assert_eq!(after_first, 3);
    assert_eq!(after_second, 3);
    assert_eq!(ctx.store().total_rows().unwrap(), 3);
}

/// A later file for the same date replaces earlier values per symbol.
#[tokio::test]
async fn test_later_ingestion_replaces_rows() {
    let mut ctx = TestContext::new();
    let day = fixtures::date(2024, 3, 4);

    let old = fixtures::row(day, "AAA", 10.0, 100);
    ctx.serve(day, fixtures::zip_payload("v1.lis", &fixtures::lines(&[&old])));
    ctx.ingest(day).await.unwrap();

    let new = fixtures::row(day, "AAA", 12.5, 999);
    ctx.serve(day, fixtures::gzip_payload("v2.lis", &fixtures::lines(&[&new])));
    ctx.ingest(day).await.unwrap();

    assert_eq!(ctx.rows_for_key("2024-03-04", "AAA"), 1);
    let record = ctx.store().get(day, "AAA").unwrap().unwrap();
    assert_eq!(record.close, 12.5);
    assert_eq!(record.volume, 999);
}

/// Duplicate symbols within one file collapse to one row; the last one wins.
#[tokio::test]
async fn test_duplicate_symbols_in_one_file_are_unique() {
    let mut ctx = TestContext::new();
    let day = fixtures::date(2024, 3, 5);
    let first = fixtures::row(day, "DUP", 1.0, 1);
    let second = fixtures::row(day, "DUP", 2.0, 2);
    ctx.serve(
        day,
        fixtures::zip_payload("dup.lis", &fixtures::lines(&[&first, &second])),
    );

    ctx.ingest(day).await.unwrap();

    assert_eq!(ctx.rows_for_key("2024-03-05", "DUP"), 1);
    assert_eq!(ctx.store().get(day, "DUP").unwrap().unwrap().volume, 2);
}

/// The same symbol on different dates is two rows.
#[tokio::test]
async fn test_same_symbol_on_two_dates() {
    let mut ctx = TestContext::new();
    let monday = fixtures::date(2024, 3, 4);
    let tuesday = fixtures::date(2024, 3, 5);

    let row = fixtures::row(monday, "AAA", 10.0, 100);
    ctx.serve(monday, fixtures::zip_payload("a.lis", &fixtures::lines(&[&row])));
    let row = fixtures::row(tuesday, "AAA", 11.0, 110);
    ctx.serve(tuesday, fixtures::zip_payload("b.lis", &fixtures::lines(&[&row])));

    ctx.ingest(monday).await.unwrap();
    ctx.ingest(tuesday).await.unwrap();

    assert_eq!(ctx.store().total_rows().unwrap(), 2);
    assert_eq!(ctx.store().dates().unwrap(), vec![monday, tuesday]);
}

/// Committed rows are on disk, not only in the open connection.
#[tokio::test]
async fn test_committed_rows_survive_reopen() {
    let mut ctx = TestContext::new();
    let day = fixtures::date(2024, 1, 1);
    ctx.serve(
        day,
        fixtures::zip_payload("closing11.lis", &fixtures::mixed_payload()),
    );
    ctx.ingest(day).await.unwrap();

    let reopened = Store::open(StoreConfig {
        path: ctx.db_path().clone(),
        ..StoreConfig::default()
    })
    .unwrap();

    assert!(health::check_connection(&reopened));
    assert_eq!(reopened.count_for_date(day).unwrap(), 1);
}
