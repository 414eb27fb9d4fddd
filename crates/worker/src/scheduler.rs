//! Daily ingestion scheduler.
//!
//! Two modes driven by one control loop: an optional `Backfill` over an
//! explicit range, then `DailyWait` forever. In `DailyWait` the loop sleeps
//! until the next local trigger time and ingests that local date.

use chrono::{DateTime, Days, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use telemetry::{log_snapshot, metrics};
use tracing::{error, info};

use crate::backfill::{BackfillWorker, DateRange};
use crate::ingest::Ingestor;

/// Scheduler mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Backfill(DateRange),
    DailyWait,
}

/// Next trigger instant at local time `at`, strictly today unless already passed.
pub fn next_trigger(now: DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    let candidate = resolve_local(&tz, today.and_time(at));
    if now <= candidate {
        return candidate;
    }

    let tomorrow = today + Days::new(1);
    resolve_local(&tz, tomorrow.and_time(at))
}

/// Maps a local wall-clock time to an instant, stepping past DST gaps.
fn resolve_local(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    let mut candidate = local;
    for _ in 0..8 {
        if let Some(t) = tz.from_local_datetime(&candidate).earliest() {
            return t;
        }
        candidate += Duration::minutes(30);
    }
    tz.from_utc_datetime(&local)
}

/// Drives backfill and the daily loop.
pub struct Scheduler {
    ingestor: Ingestor,
    tz: Tz,
    at: NaiveTime,
    mode: Mode,
}

impl Scheduler {
    /// Creates a scheduler that starts in `Backfill` when a range is given.
    pub fn new(ingestor: Ingestor, tz: Tz, at: NaiveTime, backfill: Option<DateRange>) -> Self {
        let mode = match backfill {
            Some(range) => Mode::Backfill(range),
            None => Mode::DailyWait,
        };

        Self {
            ingestor,
            tz,
            at,
            mode,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Runs until the process is terminated.
    pub async fn run(mut self) {
        info!(
            timezone = %self.tz,
            trigger = %self.at,
            mode = ?self.mode,
            "Scheduler starting"
        );

        loop {
            self.step().await;
        }
    }

    /// Executes the current mode once and moves to the next one.
    pub async fn step(&mut self) {
        match self.mode {
            Mode::Backfill(range) => {
                BackfillWorker::new(range).run(&mut self.ingestor).await;
                log_snapshot(&metrics().snapshot());
                self.mode = Mode::DailyWait;
            }
            Mode::DailyWait => {
                self.wait_and_ingest().await;
                log_snapshot(&metrics().snapshot());
            }
        }
    }

    async fn wait_and_ingest(&mut self) {
        let now = Utc::now().with_timezone(&self.tz);
        let next = next_trigger(now, self.at);
        info!(time = %next, "Next scheduled run");

        let wait = (next.with_timezone(&Utc) - Utc::now())
            .to_std()
            .unwrap_or_default();
        tokio::time::sleep(wait).await;

        let date = Utc::now().with_timezone(&self.tz).date_naive();
        match self.ingestor.ingest(date).await {
            Ok(outcome) => info!(
                date = %date,
                records = outcome.inserted_count,
                errors = outcome.error_count,
                "Scheduled run complete"
            ),
            Err(e) => error!(
                date = %date,
                code = e.code(),
                error = %e,
                "Market data processing failed"
            ),
        }
    }
}
