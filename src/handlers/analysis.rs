use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{AnalysisResponse, ChatRequest};
use crate::services::{image, prompt, InferenceService};

/// Per-deployment knobs for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub model: String,
    pub max_completion_tokens: u32,
    pub jpeg_quality: u8,
}

impl From<&Config> for AnalysisSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.openai_model.clone(),
            max_completion_tokens: config.max_completion_tokens,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// Turns one uploaded photo plus notes into a nutrition estimate.
///
/// Holds no per-request state; one instance is shared by every request.
pub struct AnalysisHandler {
    inference: Arc<dyn InferenceService>,
    settings: AnalysisSettings,
}

impl AnalysisHandler {
    pub fn new(inference: Arc<dyn InferenceService>, settings: AnalysisSettings) -> Self {
        Self { inference, settings }
    }

    /// Never fails: every error becomes `AnalysisResponse::Error`.
    pub async fn analyze(&self, image_bytes: Vec<u8>, notes: &str) -> AnalysisResponse {
        log::info!(
            "📸 Analysis request: {} image bytes, notes: {}",
            image_bytes.len(),
            !notes.trim().is_empty()
        );

        let response = AnalysisResponse::from(self.try_analyze(image_bytes, notes).await);
        match &response {
            AnalysisResponse::Result(text) => {
                log::info!("✅ Analysis completed ({} chars)", text.len())
            }
            AnalysisResponse::Error(message) => log::warn!("⚠️ Analysis failed: {}", message),
        }
        response
    }

    async fn try_analyze(&self, image_bytes: Vec<u8>, notes: &str) -> Result<String> {
        let quality = self.settings.jpeg_quality;
        // Decoding and re-encoding are CPU bound
        let data_url = tokio::task::spawn_blocking(move || {
            image::normalize_for_transport(&image_bytes, quality)
        })
        .await??;

        let instruction = prompt::build_user_instruction(notes);
        let request = ChatRequest {
            model: self.settings.model.clone(),
            max_completion_tokens: self.settings.max_completion_tokens,
            messages: prompt::build_messages(instruction, data_url),
        };

        self.inference.complete(&request).await
    }
}
