use crate::state::AppState;
use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

/// Re-checks the day boundary so a process left running past midnight resets.
pub fn spawn_rollover_timer(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            state.session.lock().await.tick().await;
        }
    })
}

pub fn spawn_heart_rate_timer(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let mut session = state.session.lock().await;
            session.jitter_heart_rate(&mut rand::thread_rng());
        }
    })
}
