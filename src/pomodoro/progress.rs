use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use super::pomodoro::DAILY_GOAL;
use crate::error::StorageReadError;
use crate::storage::Storage;
use crate::storage::storage::PROGRESS_KEY;

const DATE_STAMP_FORMAT: &str = "%a %b %d %Y";

pub fn date_stamp(day: NaiveDate) -> String {
    day.format(DATE_STAMP_FORMAT).to_string()
}

/// Today's accumulated focus activity, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub date: String,
    pub completed_pomodoros: u32,
    pub total_focus_time: u32,
}

/// In-memory counters plus the day they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyProgress {
    pub day: NaiveDate,
    pub completed: u32,
    pub focus_minutes: u32,
}

impl DailyProgress {
    pub fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            completed: 0,
            focus_minutes: 0,
        }
    }

    fn read(storage: &impl Storage) -> Result<Option<ProgressRecord>, StorageReadError> {
        let Some(raw) = storage.get(PROGRESS_KEY) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageReadError::Malformed {
                key: PROGRESS_KEY,
                source,
            })
    }

    /// Counters are only restored when the stored stamp is `today`.
    pub fn load(storage: &impl Storage, today: NaiveDate) -> Self {
        match Self::read(storage) {
            Ok(Some(record)) if record.date == date_stamp(today) => Self {
                day: today,
                completed: record.completed_pomodoros,
                focus_minutes: record.total_focus_time,
            },
            Ok(_) => Self::empty(today),
            Err(e) => {
                warn!("Ignoring stored progress: {}", e);
                Self::empty(today)
            }
        }
    }

    pub fn save(&self, storage: &mut impl Storage) {
        let record = ProgressRecord {
            date: date_stamp(self.day),
            completed_pomodoros: self.completed,
            total_focus_time: self.focus_minutes,
        };
        match serde_json::to_string(&record) {
            Ok(json) => storage.set(PROGRESS_KEY, &json),
            Err(e) => warn!("Failed to encode progress: {}", e),
        }
    }

    /// Counts one finished focus interval on `today`, starting over if the
    /// counters belong to an earlier day.
    pub fn record_focus(&mut self, today: NaiveDate, minutes: u32) {
        if today != self.day {
            *self = Self::empty(today);
        }
        self.completed = self.completed.saturating_add(1);
        self.focus_minutes = self.focus_minutes.saturating_add(minutes);
    }

    pub fn percent_of_goal(&self) -> f64 {
        (f64::from(self.completed) / f64::from(DAILY_GOAL) * 100.0).min(100.0)
    }
}
