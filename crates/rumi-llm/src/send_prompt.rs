//! The `SendPrompt` capability trait (§6) and its HTTP implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_TRANSPORT_RETRIES: u32 = 2;
const RETRY_BACKOFF_MS: u64 = 500;

#[derive(Debug, Clone, Serialize)]
pub struct SendPromptResult {
    pub success: bool,
    pub response_text: Option<String>,
    pub usage: Option<Value>,
    pub error: Option<String>,
}

impl SendPromptResult {
    pub fn ok(response_text: impl Into<String>, usage: Option<Value>) -> Self {
        Self { success: true, response_text: Some(response_text.into()), usage, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, response_text: None, usage: None, error: Some(error.into()) }
    }
}

/// The external LLM capability, kept behind a small trait so C7 can be
/// tested against a stub instead of the network.
#[async_trait]
pub trait SendPrompt: Send + Sync {
    async fn send_prompt(&self, prompt: &str, context: &Value, timeout_s: u64) -> SendPromptResult;
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// Reqwest-backed `SendPrompt`. Retries transport-level failures
/// (connection errors, non-2xx status) a bounded number of times with a
/// fixed backoff; never retries on malformed JSON, since that is C8's
/// concern, not the transport's (§4.7/§2: "the core never retries inside
/// C7; the capability is responsible for transport-level retries").
pub struct HttpSendPrompt {
    client: reqwest::Client,
    api_key: String,
    endpoint_base: String,
}

impl HttpSendPrompt {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint_base: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoint_base(api_key: impl Into<String>, endpoint_base: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), api_key: api_key.into(), endpoint_base: endpoint_base.into() }
    }

    async fn call_once(&self, model: &str, full_prompt: &str, timeout_s: u64) -> Result<String, String> {
        let url = format!("{}/{}:generateContent?key={}", self.endpoint_base, model, self.api_key);
        let request = GeminiRequest {
            contents: vec![Content { parts: vec![Part { text: full_prompt.to_string() }] }],
            generation_config: GenerationConfig { response_mime_type: "application/json".to_string() },
        };

        let response = self
            .client
            .post(&url)
            .timeout(std::time::Duration::from_secs(timeout_s))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("transport error: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("transport error: LLM API returned {status}: {body}"));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| format!("transport error: failed to parse response envelope: {e}"))?;
        parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| "no content in LLM response".to_string())
    }
}

#[async_trait]
impl SendPrompt for HttpSendPrompt {
    async fn send_prompt(&self, prompt: &str, context: &Value, timeout_s: u64) -> SendPromptResult {
        let full_prompt = format!("{prompt}\n\nCONTEXT:\n{context}");
        let model = "gemini-2.5-flash";

        let mut last_error = String::new();
        for attempt in 0..=MAX_TRANSPORT_RETRIES {
            match self.call_once(model, &full_prompt, timeout_s).await {
                Ok(text) => return SendPromptResult::ok(text, None),
                Err(err) => {
                    let is_transport = err.starts_with("transport error");
                    last_error = err;
                    if !is_transport || attempt == MAX_TRANSPORT_RETRIES {
                        break;
                    }
                    tracing::warn!(attempt, error = %last_error, "transport error calling LLM capability, retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(RETRY_BACKOFF_MS * (attempt as u64 + 1))).await;
                }
            }
        }
        SendPromptResult::failed(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn successful_call_returns_response_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"/.*:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "{\"CoreMetrics\":{\"confidence\":0.9}}"}]}}]
            })))
            .mount(&server)
            .await;

        let capability = HttpSendPrompt::with_endpoint_base("test-key", server.uri());
        let result = capability.send_prompt("analyze", &serde_json::json!({}), 5).await;
        assert!(result.success);
        assert!(result.response_text.unwrap().contains("CoreMetrics"));
    }

    #[tokio::test]
    async fn non_success_status_is_reported_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"/.*:generateContent"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let capability = HttpSendPrompt::with_endpoint_base("test-key", server.uri());
        let result = capability.send_prompt("analyze", &serde_json::json!({}), 5).await;
        assert!(!result.success);
    }
}
