use chrono::{Duration, Local, NaiveDate};
use std::sync::Mutex;

/// Source of "today" for day-boundary decisions. Always the local calendar
/// day, never UTC.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.lock() = date;
    }

    pub fn advance_days(&self, days: i64) {
        let mut today = self.lock();
        *today += Duration::days(days);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDate> {
        // a poisoned date is still a valid date
        self.today.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.lock()
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
