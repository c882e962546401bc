use crate::chat::TurnRejected;
use crate::errors::AppError;
use crate::models::{
    ChatReply, ChatRequest, ChatTranscript, DailySummary, MetricsRecord, SleepRequest,
    StepsRequest, WaterRequest,
};
use crate::session::{add_steps, add_water, adjust_sleep, DEFAULT_STEP_INCREMENT};
use crate::state::AppState;
use crate::stats::build_summary;
use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;
use tracing::info;

pub async fn get_today(State(state): State<AppState>) -> Json<DailySummary> {
    let mut session = state.session.lock().await;
    let record = session.snapshot().await;
    Json(build_summary(session.last_reset(), record))
}

pub async fn add_water_entry(
    State(state): State<AppState>,
    Json(payload): Json<WaterRequest>,
) -> Result<Json<DailySummary>, AppError> {
    if payload.amount_ml == 0 {
        return Err(AppError::bad_request("amount_ml must be greater than zero"));
    }

    let amount = payload.amount_ml;
    Ok(Json(apply(&state, |r| add_water(r, amount)).await))
}

/// An empty body adds the default increment; anything else must parse.
pub async fn add_steps_entry(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DailySummary>, AppError> {
    let steps = if body.iter().all(u8::is_ascii_whitespace) {
        DEFAULT_STEP_INCREMENT
    } else {
        serde_json::from_slice::<StepsRequest>(&body)
            .map_err(|err| AppError::bad_request(format!("invalid steps body: {err}")))?
            .steps
            .unwrap_or(DEFAULT_STEP_INCREMENT)
    };
    if steps == 0 {
        return Err(AppError::bad_request("steps must be greater than zero"));
    }

    Ok(Json(apply(&state, |r| add_steps(r, steps)).await))
}

pub async fn adjust_sleep_entry(
    State(state): State<AppState>,
    Json(payload): Json<SleepRequest>,
) -> Result<Json<DailySummary>, AppError> {
    if !payload.delta_hours.is_finite() {
        return Err(AppError::bad_request("delta_hours must be a finite number"));
    }

    let delta = payload.delta_hours;
    Ok(Json(apply(&state, |r| adjust_sleep(r, delta)).await))
}

pub async fn reset_day(State(state): State<AppState>) -> Json<DailySummary> {
    info!("manual reset of daily metrics");
    Json(apply(&state, |_| MetricsRecord::baseline()).await)
}

pub async fn get_chat(State(state): State<AppState>) -> Json<ChatTranscript> {
    Json(ChatTranscript {
        messages: state.chat.messages(),
        pending: state.chat.is_pending(),
    })
}

pub async fn send_chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let turn = state.chat.begin_turn(&payload.message).map_err(|rejected| match rejected {
        TurnRejected::Blank => AppError::bad_request("message must not be empty"),
        TurnRejected::Pending => AppError::conflict("the coach is still answering"),
    })?;

    // the turn settles in its own task even if the client goes away
    let session = Arc::clone(&state.session);
    let advice = state.advice.clone();
    let reply = tokio::spawn(async move {
        let record = session.lock().await.snapshot().await;
        let reply = advice.request_advice(&record, &payload.message).await;
        turn.finish(reply.clone());
        reply
    })
    .await
    .map_err(AppError::internal)?;

    Ok(Json(ChatReply { reply }))
}

async fn apply<F>(state: &AppState, change: F) -> DailySummary
where
    F: FnOnce(MetricsRecord) -> MetricsRecord + Send,
{
    let mut session = state.session.lock().await;
    let updated = session.mutate(change).await;
    build_summary(session.last_reset(), updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{AdviceClient, AdviceProvider};
    use crate::clock::ManualClock;
    use crate::errors::ProviderError;
    use crate::models::{ChatMessage, Role};
    use crate::session::SessionStore;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use std::time::Duration;

    struct SlowProvider(Duration);

    #[async_trait]
    impl AdviceProvider for SlowProvider {
        async fn generate(&self, _: &str, user_text: &str) -> Result<String, ProviderError> {
            tokio::time::sleep(self.0).await;
            Ok(format!("re: {user_text}"))
        }
    }

    async fn test_state(reply_delay: Duration) -> AppState {
        let clock = Arc::new(ManualClock::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()));
        let session = SessionStore::open(MemoryStore::new(), clock).await;
        AppState::new(session, AdviceClient::new(Arc::new(SlowProvider(reply_delay))))
    }

    fn steps_body(raw: &str) -> Bytes {
        Bytes::from(raw.to_string())
    }

    #[tokio::test]
    async fn empty_steps_body_adds_default_increment() {
        let state = test_state(Duration::ZERO).await;
        let Json(summary) = add_steps_entry(State(state.clone()), Bytes::new())
            .await
            .unwrap();
        assert_eq!(summary.metrics.steps, 500);

        let Json(summary) = add_steps_entry(State(state), steps_body(r#"{"steps": 120}"#))
            .await
            .unwrap();
        assert_eq!(summary.metrics.steps, 620);
    }

    #[tokio::test]
    async fn malformed_steps_body_is_rejected() {
        let state = test_state(Duration::ZERO).await;
        for raw in [r#"{"steps": -40}"#, r#"{"steps": "abc"}"#, "steps=10"] {
            let err = add_steps_entry(State(state.clone()), steps_body(raw))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "body {raw:?}");
        }
        assert_eq!(state.session.lock().await.current().steps, 0);
    }

    #[tokio::test]
    async fn cancelled_chat_request_still_records_the_reply() {
        let state = test_state(Duration::from_millis(200)).await;
        let request = send_chat(
            State(state.clone()),
            Json(ChatRequest {
                message: "hello".to_string(),
            }),
        );
        assert!(tokio::time::timeout(Duration::from_millis(20), request)
            .await
            .is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;
        let messages = state.chat.messages();
        assert!(!state.chat.is_pending());
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ChatMessage::user("hello"));
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "re: hello");
    }

    #[tokio::test]
    async fn second_chat_while_answering_conflicts() {
        let state = test_state(Duration::from_millis(100)).await;
        let first = tokio::spawn(send_chat(
            State(state.clone()),
            Json(ChatRequest {
                message: "first".to_string(),
            }),
        ));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let err = send_chat(
            State(state.clone()),
            Json(ChatRequest {
                message: "second".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let Json(reply) = first.await.unwrap().unwrap();
        assert_eq!(reply.reply, "re: first");
        assert_eq!(state.chat.messages().len(), 3);
    }
}
