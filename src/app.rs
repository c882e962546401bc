use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/today", get(handlers::get_today))
        .route("/api/water", post(handlers::add_water_entry))
        .route("/api/steps", post(handlers::add_steps_entry))
        .route("/api/sleep", post(handlers::adjust_sleep_entry))
        .route("/api/reset", post(handlers::reset_day))
        .route("/api/chat", get(handlers::get_chat).post(handlers::send_chat))
        .with_state(state)
}
