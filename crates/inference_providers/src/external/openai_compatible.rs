//! OpenAI-compatible provider implementation
//!
//! This provider handles any backend that speaks OpenAI's chat completion format,
//! including:
//! - OpenRouter (openrouter.ai/api/v1)
//! - OpenAI (api.openai.com)
//! - Together AI, Groq, Fireworks AI

use super::backend::BackendConfig;
use crate::{
    sse_parser::new_sse_parser, ChatCompletionParams, ChatCompletionResponse, CompletionError,
    InferenceProvider, StreamingResult,
};
use async_trait::async_trait;
use reqwest::{header::HeaderValue, Client};

/// OpenAI-compatible provider
///
/// Holds one pooled HTTP client for the lifetime of the process. The caller's API key is
/// attached per request.
pub struct OpenAiCompatibleProvider {
    config: BackendConfig,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: BackendConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(|e| {
                CompletionError::CompletionError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn build_headers(&self, api_key: &str) -> Result<reqwest::header::HeaderMap, String> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        // Authorization header
        let auth_value = format!("Bearer {api_key}");
        let header_value = HeaderValue::from_str(&auth_value)
            .map_err(|e| format!("Invalid API key format: {e}"))?;
        headers.insert("Authorization", header_value);

        Ok(headers)
    }

    async fn error_from_response(response: reqwest::Response) -> CompletionError {
        let status_code = response.status().as_u16();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|e| format!("Failed to read error response body: {e}"));
        let message = crate::extract_error_message(&error_text);
        tracing::debug!(status_code, "Provider rejected request: {}", message);
        CompletionError::HttpError {
            status_code,
            message,
        }
    }
}

#[async_trait]
impl InferenceProvider for OpenAiCompatibleProvider {
    async fn chat_completion_stream(
        &self,
        params: ChatCompletionParams,
        api_key: &str,
    ) -> Result<StreamingResult, CompletionError> {
        let url = self.config.chat_completions_url();

        let mut streaming_params = params;
        streaming_params.stream = Some(true);

        let headers = self
            .build_headers(api_key)
            .map_err(CompletionError::CompletionError)?;

        tracing::debug!(
            model = %streaming_params.model,
            messages = streaming_params.messages.len(),
            max_tokens = ?streaming_params.max_tokens,
            "Sending streaming chat completion"
        );

        // No overall timeout: the body stays open for as long as the model generates
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&streaming_params)
            .send()
            .await
            .map_err(|e| CompletionError::CompletionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let sse_stream = new_sse_parser(response.bytes_stream());
        Ok(Box::pin(sse_stream))
    }

    async fn chat_completion(
        &self,
        params: ChatCompletionParams,
        api_key: &str,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        let url = self.config.chat_completions_url();

        // Ensure non-streaming
        let mut non_streaming_params = params;
        non_streaming_params.stream = Some(false);

        let headers = self
            .build_headers(api_key)
            .map_err(CompletionError::CompletionError)?;

        let timeout = std::time::Duration::from_secs(self.config.timeout_seconds.max(1) as u64);

        tracing::debug!(
            model = %non_streaming_params.model,
            messages = non_streaming_params.messages.len(),
            "Sending chat completion"
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .timeout(timeout)
            .json(&non_streaming_params)
            .send()
            .await
            .map_err(|e| CompletionError::CompletionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let raw_bytes = response
            .bytes()
            .await
            .map_err(|e| CompletionError::CompletionError(e.to_string()))?;

        serde_json::from_slice(&raw_bytes).map_err(|e| {
            CompletionError::InvalidResponse(format!("Failed to parse response: {e}"))
        })
    }
}
