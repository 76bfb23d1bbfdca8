//! Inference providers crate for talking to OpenAI-compatible chat completion backends
//!
//! The crate exposes a small trait, [`InferenceProvider`], with one streaming and one
//! non-streaming chat completion method. Streaming responses are surfaced as a stream of
//! [`SSEEvent`]s, each of which keeps the exact bytes received from the provider so callers
//! can relay them untouched while still inspecting the parsed chunk.
//!
//! # Credentials
//!
//! Providers are long-lived, shared handles built once at start-up. The provider API key is
//! supplied per call, which lets one pooled HTTP client serve many callers with their own
//! credentials.
//!
//! # Usage
//!
//! ```rust,ignore
//! use inference_providers::{ChatCompletionParams, ChatMessage, InferenceProvider};
//! use futures_util::StreamExt;
//!
//! async fn example<P: InferenceProvider>(provider: P) {
//!     let params = ChatCompletionParams::new(
//!         "openai/gpt-4o-mini",
//!         vec![ChatMessage::user("What happened in Rust 1.80?")],
//!     );
//!
//!     let mut stream = provider.chat_completion_stream(params, "sk-or-...").await?;
//!     while let Some(event) = stream.next().await {
//!         match event {
//!             Ok(event) => forward(event.raw_bytes),
//!             Err(e) => eprintln!("Stream error: {}", e),
//!         }
//!     }
//! }
//! ```

pub mod external;
pub mod mock;
pub mod models;
pub mod sse_parser;

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

// Re-export commonly used types for convenience
pub use mock::MockProvider;
pub use models::{
    ChatChoice, ChatCompletionChunk, ChatCompletionParams, ChatCompletionResponse,
    ChatCompletionResponseChoice, ChatDelta, ChatMessage, ChatResponseMessage, CompletionError,
    MessageRole, TokenUsage,
};
pub use sse_parser::{SSEEvent, SSEParser};

pub use external::{BackendConfig, OpenAiCompatibleProvider};

/// Type alias for streaming completion results
///
/// This represents a stream of SSE events where each event contains:
/// - `raw_bytes` - The exact bytes received from the source (for forwarding)
/// - `chunk` - The parsed chunk, when the event carried one
pub type StreamingResult = Pin<Box<dyn Stream<Item = Result<SSEEvent, CompletionError>> + Send>>;

#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Performs a streaming chat completion request
    ///
    /// Returns a stream of SSE events as they arrive from the provider. An error
    /// returned from this method means the provider rejected the request before any
    /// event was produced; errors inside the stream mean the provider failed mid-way.
    async fn chat_completion_stream(
        &self,
        params: ChatCompletionParams,
        api_key: &str,
    ) -> Result<StreamingResult, CompletionError>;

    /// Performs a non-streaming chat completion request
    async fn chat_completion(
        &self,
        params: ChatCompletionParams,
        api_key: &str,
    ) -> Result<ChatCompletionResponse, CompletionError>;
}

/// Extract a human-readable message from a provider error body.
///
/// Providers usually answer with `{"error": {"message": "..."}}`, some with
/// `{"error": "..."}` or `{"message": "..."}`. Anything else is returned as-is.
pub fn extract_error_message(body: &str) -> String {
    let trimmed = body.trim();
    let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return trimmed.to_string();
    };

    let message = match json.get("error") {
        Some(serde_json::Value::Object(error)) => error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        Some(serde_json::Value::String(error)) => Some(error.clone()),
        _ => json
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
    };

    message.unwrap_or_else(|| trimmed.to_string())
}
