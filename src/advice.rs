use crate::errors::ProviderError;
use crate::models::MetricsRecord;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};

pub const PROVIDER_FALLBACK: &str =
    "The AI coach is currently taking a break. Please try again in a moment.";
pub const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't generate advice right now.";

#[async_trait]
pub trait AdviceProvider: Send + Sync {
    /// Generates a reply to `user_text` under `system_instruction`. An empty
    /// string means the provider answered without any text.
    async fn generate(
        &self,
        system_instruction: &str,
        user_text: &str,
    ) -> Result<String, ProviderError>;
}

#[derive(Clone)]
pub struct AdviceClient {
    provider: Arc<dyn AdviceProvider>,
}

impl AdviceClient {
    pub fn new(provider: Arc<dyn AdviceProvider>) -> Self {
        Self { provider }
    }

    pub async fn request_advice(&self, record: &MetricsRecord, user_text: &str) -> String {
        let instruction = system_instruction(record);
        match self.provider.generate(&instruction, user_text).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("advice provider returned no text");
                EMPTY_REPLY_FALLBACK.to_string()
            }
            Ok(text) => text,
            Err(err) => {
                error!("advice provider error: {err}");
                PROVIDER_FALLBACK.to_string()
            }
        }
    }
}

pub fn system_instruction(record: &MetricsRecord) -> String {
    format!(
        "You are Health AI, a world-class health and fitness coach.\n\
         The user's current daily stats are:\n\
         - Steps: {steps}\n\
         - Water: {water}ml\n\
         - Calories Burned: {calories}\n\
         - Heart Rate: {heart_rate}bpm\n\
         - Distance: {distance}km\n\
         - Sleep: {sleep} hours\n\
         \n\
         Provide actionable, encouraging, and science-backed health advice based on these metrics.\n\
         Keep responses concise, empathetic, and professional.\n\
         If the user asks medical questions, remind them you are an AI assistant and they should \
         consult a doctor for serious concerns.",
        steps = record.steps,
        water = record.water_intake_ml,
        calories = record.calories_burned,
        heart_rate = record.heart_rate_bpm,
        distance = record.distance_km,
        sleep = record.sleep_hours,
    )
}
