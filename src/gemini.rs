use crate::advice::AdviceProvider;
use crate::errors::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout: Option<Duration>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
        }
    }
}

/// `generateContent` over HTTPS.
pub struct GeminiProvider {
    http: Client,
    settings: GeminiSettings,
}

impl GeminiProvider {
    pub fn new(settings: GeminiSettings) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            settings,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        )
    }
}

#[async_trait]
impl AdviceProvider for GeminiProvider {
    async fn generate(
        &self,
        system_instruction: &str,
        user_text: &str,
    ) -> Result<String, ProviderError> {
        let api_key = match self.settings.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(ProviderError::MissingCredential),
        };

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: user_text }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
            },
        };

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;
        Ok(body.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode, Uri},
        Json, Router,
    };
    use serde_json::{json, Value};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn provider(endpoint: String, api_key: Option<&str>) -> GeminiProvider {
        GeminiProvider::new(GeminiSettings {
            endpoint,
            api_key: api_key.map(str::to_string),
            ..GeminiSettings::default()
        })
        .unwrap()
    }

    const GENERATE_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

    async fn echo_shape(
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if uri.path() != GENERATE_PATH {
            return (StatusCode::NOT_FOUND, Json(json!({ "error": uri.path() })));
        }
        if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
        }
        let system = body["systemInstruction"]["parts"][0]["text"].as_str().unwrap_or("");
        let user = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or("");
        let role = body["contents"][0]["role"].as_str().unwrap_or("");
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap_or(0.0);
        let reply = format!("{role}|{user}|{}|{temperature:.1}", system.len());
        (
            StatusCode::OK,
            Json(json!({
                "candidates": [{ "content": { "role": "model", "parts": [{ "text": reply }] } }]
            })),
        )
    }

    #[tokio::test]
    async fn sends_instruction_and_reads_first_candidate() {
        let base = serve(Router::new().fallback(echo_shape)).await;

        let reply = provider(base, Some("test-key"))
            .generate("coach persona", "Drink more water?")
            .await
            .unwrap();
        assert_eq!(reply, "user|Drink more water?|13|0.7");
    }

    #[tokio::test]
    async fn joins_text_parts() {
        let base = serve(Router::new().fallback(|| async {
            Json(json!({
                "candidates": [{ "content": { "parts": [
                    { "text": "Drink " }, { "text": "more water" }
                ] } }]
            }))
        }))
        .await;

        let reply = provider(base, Some("k")).generate("sys", "q").await.unwrap();
        assert_eq!(reply, "Drink more water");
    }

    #[tokio::test]
    async fn missing_candidates_yield_empty_text() {
        let base = serve(Router::new().fallback(|| async {
            Json(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
        }))
        .await;

        let reply = provider(base, Some("k")).generate("sys", "q").await.unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let base = serve(Router::new().fallback(|| async {
            (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
        }))
        .await;

        let err = provider(base, Some("k")).generate("sys", "q").await.unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let base = serve(Router::new().fallback(|| async { "definitely not json" })).await;

        let err = provider(base, Some("k")).generate("sys", "q").await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let err = provider("http://127.0.0.1:9".to_string(), None)
            .generate("sys", "q")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = provider(format!("http://127.0.0.1:{port}"), Some("k"))
            .generate("sys", "q")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
