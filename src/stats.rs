use crate::clock::date_key;
use crate::models::{DailySummary, MetricsRecord};
use chrono::NaiveDate;

pub const WATER_GOAL_ML: u64 = 3000;
pub const STEP_GOAL: u64 = 10_000;

pub fn build_summary(today: NaiveDate, record: MetricsRecord) -> DailySummary {
    DailySummary {
        date: date_key(today),
        water_progress_percent: water_progress(record.water_intake_ml),
        strategy_hint: strategy_hint(record.steps),
        water_goal_ml: WATER_GOAL_ML,
        step_goal: STEP_GOAL,
        metrics: record,
    }
}

fn water_progress(water_ml: u64) -> f64 {
    (water_ml as f64 / WATER_GOAL_ML as f64 * 100.0).min(100.0)
}

fn strategy_hint(steps: u64) -> String {
    if steps == 0 {
        "You haven't started your steps yet today! A short walk can boost your energy levels."
            .to_string()
    } else {
        format!("You've taken {steps} steps so far. Keep it up!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn fresh_day_summary() {
        let summary = build_summary(today(), MetricsRecord::baseline());
        assert_eq!(summary.date, "2026-10-16");
        assert_eq!(summary.water_progress_percent, 0.0);
        assert!(summary.strategy_hint.starts_with("You haven't started"));
    }

    #[test]
    fn water_progress_is_capped() {
        let mut record = MetricsRecord::baseline();
        record.water_intake_ml = 1500;
        assert_eq!(build_summary(today(), record).water_progress_percent, 50.0);

        record.water_intake_ml = 4250;
        assert_eq!(build_summary(today(), record).water_progress_percent, 100.0);
    }

    #[test]
    fn hint_mentions_steps_taken() {
        let mut record = MetricsRecord::baseline();
        record.steps = 4500;
        assert_eq!(
            build_summary(today(), record).strategy_hint,
            "You've taken 4500 steps so far. Keep it up!"
        );
    }
}
