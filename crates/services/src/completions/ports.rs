use async_trait::async_trait;
use inference_providers::{ChatCompletionResponse, CompletionError, StreamingResult};
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

use crate::chat::ports::{ChatMessage, ChatSettings};

/// Per-model output token limits. Models missing here use the provider default.
const MODEL_MAX_OUTPUT_TOKENS: &[(&str, i64)] = &[("mistralai/mistral-7b-instruct", 16000)];

/// Output token limit for a model id, if one is configured
pub fn max_tokens_for_model(model: &str) -> Option<i64> {
    MODEL_MAX_OUTPUT_TOKENS
        .iter()
        .find(|(id, _)| *id == model)
        .map(|(_, limit)| *limit)
}

// Request/Response models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<i64>,
    pub temperature: Option<f32>,
    /// Provider credential for this call. Never logged.
    #[serde(skip_serializing)]
    pub api_key: String,
}

impl CompletionRequest {
    /// Request for the chat settings of one pipeline run.
    ///
    /// `max_output_tokens` from the settings is not forwarded; the limit comes from
    /// [`max_tokens_for_model`].
    pub fn for_settings(
        settings: &ChatSettings,
        messages: Vec<ChatMessage>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            model: settings.model.clone(),
            max_tokens: max_tokens_for_model(&settings.model),
            temperature: Some(settings.temperature),
            messages,
            api_key: api_key.into(),
        }
    }
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait CompletionServiceTrait: Send + Sync {
    /// Create a non-streaming completion
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<ChatCompletionResponse, CompletionError>;

    /// Create a streaming completion
    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<StreamingResult, CompletionError>;
}
