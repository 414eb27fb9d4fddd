//! Backfill tests: sequential ingestion over a date range.

use std::sync::Arc;

use chrono::NaiveTime;
use engine_core::RangeError;
use integration_tests::{fixtures, mocks::MockSource, setup::TestContext};
use market_store::Store;
use worker::{BackfillWorker, DateRange, Ingestor, Mode, Scheduler};

/// Missing dates are reported and the range keeps going.
#[tokio::test]
async fn test_backfill_continues_past_failed_dates() {
    let mut ctx = TestContext::new();
    let first = fixtures::date(2024, 1, 1);
    let second = fixtures::date(2024, 1, 2);
    let third = fixtures::date(2024, 1, 3);

    let row = fixtures::row(first, "AAA", 10.0, 100);
    ctx.serve(first, fixtures::zip_payload("d1.lis", &fixtures::lines(&[&row])));
    // second: nothing published
    let row = fixtures::row(third, "AAA", 11.0, 110);
    ctx.serve(third, fixtures::gzip_payload("d3.lis", &fixtures::lines(&[&row])));

    let range = DateRange::new(first, third).unwrap();
    let report = BackfillWorker::new(range).run(&mut ctx.ingestor).await;

    assert_eq!(ctx.source.calls(), vec![first, second, third]);
    assert_eq!(report.attempted(), 3);
    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.records_inserted(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].date, second);
    assert_eq!(report.failed[0].code, "FETCH_001");

    assert_eq!(ctx.store().dates().unwrap(), vec![first, third]);
}

/// An inverted range is rejected before the source is touched.
#[tokio::test]
async fn test_inverted_range_fails_before_any_fetch() {
    let ctx = TestContext::new();
    let today = fixtures::date(2024, 1, 10);

    let err = DateRange::parse("2024-01-05", Some("2024-01-01"), today).unwrap_err();

    assert_eq!(
        err,
        RangeError::InvalidRange {
            start: fixtures::date(2024, 1, 5),
            end: fixtures::date(2024, 1, 1),
        }
    );
    assert_eq!(ctx.source.call_count(), 0);
}

#[tokio::test]
async fn test_open_ended_range_runs_through_today() {
    let mut ctx = TestContext::new();
    let today = fixtures::date(2024, 2, 29);

    let range = DateRange::parse("2024-02-27", None, today).unwrap();
    let report = BackfillWorker::new(range).run(&mut ctx.ingestor).await;

    assert_eq!(
        ctx.source.calls(),
        vec![
            fixtures::date(2024, 2, 27),
            fixtures::date(2024, 2, 28),
            today
        ]
    );
    assert_eq!(report.failed.len(), 3);
}

/// The scheduler finishes the whole backfill before switching to the daily loop.
#[tokio::test]
async fn test_scheduler_completes_backfill_before_daily_mode() {
    let source = MockSource::new();
    let first = fixtures::date(2024, 1, 1);
    let last = fixtures::date(2024, 1, 4);
    let row = fixtures::row(first, "AAA", 10.0, 100);
    source.insert(first, fixtures::zip_payload("d1.lis", &fixtures::lines(&[&row])));

    let ingestor = Ingestor::new(Arc::new(source.clone()), Store::open_in_memory().unwrap());
    let range = DateRange::new(first, last).unwrap();
    let at = NaiveTime::from_hms_opt(23, 0, 0).unwrap();
    let mut scheduler = Scheduler::new(ingestor, chrono_tz::Asia::Karachi, at, Some(range));

    assert_eq!(scheduler.mode(), Mode::Backfill(range));

    scheduler.step().await;

    assert_eq!(
        source.calls(),
        vec![
            first,
            fixtures::date(2024, 1, 2),
            fixtures::date(2024, 1, 3),
            last
        ]
    );
    assert_eq!(scheduler.mode(), Mode::DailyWait);
}

#[tokio::test]
async fn test_scheduler_without_range_starts_in_daily_mode() {
    let ingestor = Ingestor::new(
        Arc::new(MockSource::new()),
        Store::open_in_memory().unwrap(),
    );
    let at = NaiveTime::from_hms_opt(23, 0, 0).unwrap();
    let scheduler = Scheduler::new(ingestor, chrono_tz::Asia::Karachi, at, None);

    assert_eq!(scheduler.mode(), Mode::DailyWait);
}
