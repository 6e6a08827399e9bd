use anyhow::{Context, Result};

use crate::models::{ApiErrorBody, ChatRequest, ChatResponse};

/// Trait for multimodal chat completion backends (OpenAI, OpenRouter, etc.)
#[async_trait::async_trait]
pub trait InferenceService: Send + Sync {
    /// Sends one chat request and returns the first choice's text.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait::async_trait]
impl InferenceService for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        log::info!("🤖 Sending request to {} with model: {}", self.base_url, request.model);

        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .context("Failed to reach inference provider")?;

        let status = response.status();
        log::debug!("📥 Inference response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Inference API error ({}): {}", status, error_text);
            anyhow::bail!("OpenAI API error ({}): {}", status, provider_message(&error_text));
        }

        let response_text = response
            .text()
            .await
            .context("Failed to read inference response")?;
        log::debug!("📄 Raw inference response size: {} bytes", response_text.len());

        let chat_response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse inference response")?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Inference response contained no choices"))?
            .message
            .content
            .ok_or_else(|| anyhow::anyhow!("Inference response contained no message content"))?;

        log::info!("✅ Received {} chars from model", content.len());
        Ok(content)
    }
}

/// Pulls `error.message` out of a provider error body, falling back to the raw text.
fn provider_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
