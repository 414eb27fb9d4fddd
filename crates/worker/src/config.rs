//! Worker configuration.

use chrono::NaiveTime;
use chrono_tz::Tz;
use engine_core::{DateSource, RowPolicy, MIN_FIELDS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid schedule settings. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),

    #[error("invalid trigger time {hour:02}:{minute:02}")]
    InvalidTriggerTime { hour: u32, minute: u32 },
}

/// Daily trigger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// IANA timezone the trigger time is expressed in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Local hour of the daily run
    #[serde(default = "default_trigger_hour")]
    pub trigger_hour: u32,
    /// Local minute of the daily run
    #[serde(default)]
    pub trigger_minute: u32,
}

fn default_timezone() -> String {
    "Asia/Karachi".to_string()
}

fn default_trigger_hour() -> u32 {
    23
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            trigger_hour: default_trigger_hour(),
            trigger_minute: 0,
        }
    }
}

impl ScheduleConfig {
    pub fn tz(&self) -> Result<Tz, ScheduleError> {
        self.timezone
            .parse()
            .map_err(|_| ScheduleError::UnknownTimezone(self.timezone.clone()))
    }

    pub fn trigger_time(&self) -> Result<NaiveTime, ScheduleError> {
        NaiveTime::from_hms_opt(self.trigger_hour, self.trigger_minute, 0).ok_or(
            ScheduleError::InvalidTriggerTime {
                hour: self.trigger_hour,
                minute: self.trigger_minute,
            },
        )
    }
}

/// Row acceptance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Minimum field count for an accepted row
    #[serde(default = "default_min_fields")]
    pub min_fields: usize,
    /// Take each row's date from its own column or from the batch
    #[serde(default)]
    pub date_source: DateSource,
}

fn default_min_fields() -> usize {
    MIN_FIELDS
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_fields: default_min_fields(),
            date_source: DateSource::default(),
        }
    }
}

impl IngestConfig {
    pub fn row_policy(&self) -> RowPolicy {
        RowPolicy {
            min_fields: self.min_fields,
            date_source: self.date_source,
        }
    }
}
