use crate::clock::{date_key, parse_date_key, Clock, SystemClock};
use crate::errors::StorageError;
use crate::models::MetricsRecord;
use crate::storage::{KeyValueStore, DATE_KEY, STATS_KEY};
use chrono::NaiveDate;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const HEART_RATE_MIN_BPM: u32 = 68;
pub const HEART_RATE_MAX_BPM: u32 = 79;

pub struct SessionStore {
    storage: Box<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    record: MetricsRecord,
    last_reset: NaiveDate,
}

impl SessionStore {
    /// Opens the store against `storage` and performs the initial [`load`](Self::load).
    pub async fn open(storage: impl KeyValueStore + 'static, clock: Arc<dyn Clock>) -> Self {
        let today = clock.today();
        let mut store = Self {
            storage: Box::new(storage),
            clock,
            record: MetricsRecord::baseline(),
            last_reset: today,
        };
        store.load().await;
        store
    }

    pub async fn open_with_system_clock(storage: impl KeyValueStore + 'static) -> Self {
        Self::open(storage, Arc::new(SystemClock)).await
    }

    /// Reads persisted state, replacing it with a fresh baseline when it is
    /// missing, unreadable, or was written on another day.
    pub async fn load(&mut self) -> MetricsRecord {
        let today = self.clock.today();
        let record = match self.read_stored(today).await {
            Some(record) => record,
            None => {
                let record = MetricsRecord::baseline();
                self.persist(&record, today).await;
                record
            }
        };

        self.record = record;
        self.last_reset = today;
        record
    }

    /// Persists `record` under today's date and makes it the current record.
    pub async fn save(&mut self, record: MetricsRecord) {
        let today = self.clock.today();
        self.save_on(record, today).await;
    }

    /// Applies `change` to the current record and saves the result. The day
    /// check and the save use the same date.
    pub async fn mutate<F>(&mut self, change: F) -> MetricsRecord
    where
        F: FnOnce(MetricsRecord) -> MetricsRecord,
    {
        let today = self.clock.today();
        self.roll_over_to(today).await;
        let updated = change(self.record);
        self.save_on(updated, today).await;
        updated
    }

    /// Resets to the baseline if the calendar day changed since the last
    /// reset. Returns whether a rollover happened.
    pub async fn tick(&mut self) -> bool {
        let today = self.clock.today();
        self.roll_over_to(today).await
    }

    /// The current record, after making sure it belongs to today.
    pub async fn snapshot(&mut self) -> MetricsRecord {
        self.tick().await;
        self.record
    }

    /// Simulated live heart-rate reading. Kept in memory only; it reaches
    /// storage with the next mutation.
    pub fn jitter_heart_rate<R: Rng>(&mut self, rng: &mut R) -> u32 {
        let bpm = rng.gen_range(HEART_RATE_MIN_BPM..=HEART_RATE_MAX_BPM);
        self.record.heart_rate_bpm = bpm;
        debug!("heart rate {bpm} bpm");
        bpm
    }

    pub fn current(&self) -> &MetricsRecord {
        &self.record
    }

    pub fn last_reset(&self) -> NaiveDate {
        self.last_reset
    }

    async fn roll_over_to(&mut self, today: NaiveDate) -> bool {
        if today == self.last_reset {
            return false;
        }

        info!(
            "day rolled over from {} to {}, resetting metrics",
            date_key(self.last_reset),
            date_key(today)
        );
        self.save_on(MetricsRecord::baseline(), today).await;
        true
    }

    async fn save_on(&mut self, record: MetricsRecord, today: NaiveDate) {
        self.persist(&record, today).await;
        self.record = record;
        self.last_reset = today;
    }

    async fn read_stored(&self, today: NaiveDate) -> Option<MetricsRecord> {
        let stored_date = match self.storage.get(DATE_KEY).await {
            Ok(Some(value)) => parse_date_key(&value),
            Ok(None) => None,
            Err(err) => {
                warn!("failed to read last reset date, using defaults: {err}");
                return None;
            }
        };
        if stored_date != Some(today) {
            return None;
        }

        match self.storage.get(STATS_KEY).await {
            Ok(Some(value)) => match serde_json::from_str(&value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("stored metrics are unreadable, using defaults: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("failed to read stored metrics, using defaults: {err}");
                None
            }
        }
    }

    async fn persist(&self, record: &MetricsRecord, date: NaiveDate) {
        if let Err(err) = self.write(record, date).await {
            warn!("failed to persist metrics, keeping them in memory: {err}");
        }
    }

    async fn write(&self, record: &MetricsRecord, date: NaiveDate) -> Result<(), StorageError> {
        let payload = serde_json::to_string(record)?;
        self.storage.set(STATS_KEY, payload).await?;
        self.storage.set(DATE_KEY, date_key(date)).await?;
        Ok(())
    }
}

pub fn add_water(record: MetricsRecord, amount_ml: u64) -> MetricsRecord {
    MetricsRecord {
        water_intake_ml: record.water_intake_ml.saturating_add(amount_ml),
        ..record
    }
}

pub const DEFAULT_STEP_INCREMENT: u64 = 500;
const KM_PER_STEP: f64 = 0.0007;
const STEPS_PER_KCAL: u64 = 25;

/// Steps also advance distance and calories at fixed per-step rates. Calories
/// follow the running step total so small additions still add up.
pub fn add_steps(record: MetricsRecord, steps: u64) -> MetricsRecord {
    let total = record.steps.saturating_add(steps);
    let kcal = total / STEPS_PER_KCAL - record.steps / STEPS_PER_KCAL;
    MetricsRecord {
        steps: total,
        distance_km: record.distance_km + steps as f64 * KM_PER_STEP,
        calories_burned: record.calories_burned.saturating_add(kcal),
        ..record
    }
}

pub fn adjust_sleep(record: MetricsRecord, delta_hours: f64) -> MetricsRecord {
    MetricsRecord {
        sleep_hours: (record.sleep_hours + delta_hours).max(0.0),
        ..record
    }
}
