//! Mock implementation of InferenceProvider for testing
//!
//! This module provides a mock provider that generates realistic responses
//! without a network round trip. Streaming responses are rendered to SSE bytes
//! and fed through the real [`SSEParser`](crate::SSEParser), so consumers see
//! exactly what an HTTP-backed provider would hand them.

use crate::{
    sse_parser::new_sse_parser, ChatChoice, ChatCompletionChunk, ChatCompletionParams,
    ChatCompletionResponse, ChatCompletionResponseChoice, ChatDelta, ChatResponseMessage,
    CompletionError, InferenceProvider, StreamingResult, TokenUsage,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Request matcher for conditional responses
#[derive(Clone, Debug)]
pub enum RequestMatcher {
    /// Match any request
    Any,
    /// Match requests sent through `chat_completion_stream`
    Streaming,
    /// Match requests sent through `chat_completion`
    NonStreaming,
    /// Match requests for a specific model id
    Model(String),
}

impl RequestMatcher {
    /// Check if this matcher matches the given parameters
    pub fn matches(&self, params: &ChatCompletionParams) -> bool {
        match self {
            Self::Any => true,
            Self::Streaming => params.stream == Some(true),
            Self::NonStreaming => params.stream != Some(true),
            Self::Model(model) => params.model == *model,
        }
    }
}

/// Template for generating responses
#[derive(Clone, Debug)]
pub struct ResponseTemplate {
    /// `None` renders a response without any choices
    content: Option<String>,
    /// Exact network chunks to replay instead of generated events
    raw_stream: Option<Vec<Bytes>>,
    /// Simulate the upstream connection dropping after N network chunks
    error_after_chunks: Option<usize>,
}

impl ResponseTemplate {
    /// Create a new response template with the given content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            raw_stream: None,
            error_after_chunks: None,
        }
    }

    /// A response whose `choices` array is empty
    pub fn no_choices() -> Self {
        Self {
            content: None,
            raw_stream: None,
            error_after_chunks: None,
        }
    }

    /// Replay these exact byte chunks as the streaming body
    pub fn raw_stream<B: Into<Bytes>>(chunks: Vec<B>) -> Self {
        Self {
            content: None,
            raw_stream: Some(chunks.into_iter().map(Into::into).collect()),
            error_after_chunks: None,
        }
    }

    /// Drop the simulated connection after N network chunks
    pub fn with_error_after(mut self, chunks: usize) -> Self {
        self.error_after_chunks = Some(chunks);
        self
    }

    /// Generate a ChatCompletionResponse from this template
    fn generate_response(&self, id: String, created: i64, model: String) -> ChatCompletionResponse {
        let choices = match &self.content {
            Some(content) => vec![ChatCompletionResponseChoice {
                index: 0,
                message: ChatResponseMessage {
                    role: "assistant".to_string(),
                    content: Some(content.clone()),
                },
                finish_reason: Some("stop".to_string()),
            }],
            None => vec![],
        };
        let output_tokens = self
            .content
            .as_deref()
            .map(|c| c.split_whitespace().count() as i32)
            .unwrap_or(0);

        ChatCompletionResponse {
            id,
            object: "chat.completion".to_string(),
            created,
            model,
            choices,
            usage: Some(TokenUsage::new(10, output_tokens)),
        }
    }

    /// Render the network chunks for a streaming response.
    /// Streams word-by-word (split by spaces), one SSE event per chunk, then `[DONE]`.
    fn generate_stream(&self, id: String, created: i64, model: String) -> Vec<Bytes> {
        if let Some(raw) = &self.raw_stream {
            return raw.clone();
        }

        let content = self.content.clone().unwrap_or_default();
        let words: Vec<&str> = content.split(' ').collect();
        let mut events = Vec::with_capacity(words.len() + 1);

        for (i, word) in words.iter().enumerate() {
            let word_with_space = if i == 0 {
                word.to_string()
            } else {
                format!(" {word}")
            };
            let chunk = ChatCompletionChunk {
                id: id.clone(),
                object: "chat.completion.chunk".to_string(),
                created,
                model: model.clone(),
                choices: vec![ChatChoice {
                    index: 0,
                    delta: Some(ChatDelta {
                        role: (i == 0).then(|| "assistant".to_string()),
                        content: Some(word_with_space),
                    }),
                    finish_reason: (i == words.len() - 1).then(|| "stop".to_string()),
                }],
                usage: None,
            };
            let json = serde_json::to_string(&chunk).unwrap_or_default();
            events.push(Bytes::from(format!("data: {json}\n\n")));
        }

        events.push(Bytes::from_static(b"data: [DONE]\n\n"));
        events
    }
}

/// A request observed by the mock provider
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub params: ChatCompletionParams,
    pub api_key: String,
}

/// Configuration for a single expectation
struct MockExpectation {
    matcher: RequestMatcher,
    outcome: Result<ResponseTemplate, CompletionError>,
}

/// Configuration for the mock provider
struct MockConfig {
    expectations: Vec<MockExpectation>,
    default_response: ResponseTemplate,
    error_override: Option<CompletionError>,
}

/// Builder for configuring a single expectation
pub struct MockExpectationBuilder {
    config: Arc<Mutex<MockConfig>>,
    matcher: RequestMatcher,
}

impl MockExpectationBuilder {
    /// Set the response for this expectation
    pub async fn respond_with(self, response: ResponseTemplate) {
        self.push(Ok(response)).await;
    }

    /// Fail matching requests with this error
    pub async fn respond_with_error(self, error: CompletionError) {
        self.push(Err(error)).await;
    }

    async fn push(self, outcome: Result<ResponseTemplate, CompletionError>) {
        let mut config = self.config.lock().await;
        config.expectations.push(MockExpectation {
            matcher: self.matcher,
            outcome,
        });
    }
}

/// Mock provider that implements InferenceProvider for testing
pub struct MockProvider {
    /// Configuration for conditional responses (thread-safe)
    config: Arc<Mutex<MockConfig>>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider answering "1. 2. 3." to everything
    pub fn new() -> Self {
        Self {
            config: Arc::new(Mutex::new(MockConfig {
                expectations: Vec::new(),
                default_response: ResponseTemplate::new("1. 2. 3."),
                error_override: None,
            })),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a conditional response for a specific matcher.
    /// Expectations are checked in registration order; the first match wins.
    pub fn when(&self, matcher: RequestMatcher) -> MockExpectationBuilder {
        MockExpectationBuilder {
            config: self.config.clone(),
            matcher,
        }
    }

    /// Set the default response for requests that don't match any expectation
    pub async fn set_default_response(&self, response: ResponseTemplate) {
        let mut config = self.config.lock().await;
        config.default_response = response;
    }

    /// Fail every request with this error until cleared
    pub async fn set_error_override(&self, error: Option<CompletionError>) {
        let mut config = self.config.lock().await;
        config.error_override = error;
    }

    /// All requests received so far
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    async fn record_and_resolve(
        &self,
        params: &ChatCompletionParams,
        api_key: &str,
    ) -> Result<ResponseTemplate, CompletionError> {
        self.requests.lock().await.push(RecordedRequest {
            params: params.clone(),
            api_key: api_key.to_string(),
        });

        let config = self.config.lock().await;
        if let Some(error) = &config.error_override {
            return Err(error.clone());
        }

        config
            .expectations
            .iter()
            .find(|expectation| expectation.matcher.matches(params))
            .map(|expectation| expectation.outcome.clone())
            .unwrap_or_else(|| Ok(config.default_response.clone()))
    }

    /// Generate a chat completion ID
    fn generate_chat_id(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        SystemTime::now().hash(&mut hasher);
        format!("chatcmpl-{:x}", hasher.finish())
    }

    /// Get current timestamp
    fn current_timestamp(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    async fn chat_completion_stream(
        &self,
        params: ChatCompletionParams,
        api_key: &str,
    ) -> Result<StreamingResult, CompletionError> {
        let template = self.record_and_resolve(&params, api_key).await?;
        let chunks = template.generate_stream(
            self.generate_chat_id(),
            self.current_timestamp(),
            params.model.clone(),
        );

        let mut items: Vec<Result<Bytes, std::io::Error>> = chunks.into_iter().map(Ok).collect();
        if let Some(after) = template.error_after_chunks {
            items.truncate(after);
            items.push(Err(std::io::Error::other("mock upstream connection dropped")));
        }

        Ok(Box::pin(new_sse_parser(stream::iter(items))))
    }

    async fn chat_completion(
        &self,
        params: ChatCompletionParams,
        api_key: &str,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        let template = self.record_and_resolve(&params, api_key).await?;
        Ok(template.generate_response(
            self.generate_chat_id(),
            self.current_timestamp(),
            params.model,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatMessage;
    use futures_util::StreamExt;

    fn params(model: &str, stream: bool) -> ChatCompletionParams {
        let mut params = ChatCompletionParams::new(model, vec![ChatMessage::user("hello")]);
        params.stream = Some(stream);
        params
    }

    #[tokio::test]
    async fn test_default_response() {
        let provider = MockProvider::new();
        let response = provider
            .chat_completion(params("m", false), "key")
            .await
            .unwrap();

        assert_eq!(response.first_content(), Some("1. 2. 3."));
    }

    #[tokio::test]
    async fn test_matchers_pick_first_match() {
        let provider = MockProvider::new();
        provider
            .when(RequestMatcher::NonStreaming)
            .respond_with(ResponseTemplate::new("query"))
            .await;
        provider
            .when(RequestMatcher::Any)
            .respond_with(ResponseTemplate::new("answer"))
            .await;

        let response = provider
            .chat_completion(params("m", false), "key")
            .await
            .unwrap();
        assert_eq!(response.first_content(), Some("query"));

        let events: Vec<_> = provider
            .chat_completion_stream(params("m", true), "key")
            .await
            .unwrap()
            .collect()
            .await;
        // "answer" is a single word, then [DONE]
        assert_eq!(events.len(), 2);
        assert!(events[1].as_ref().unwrap().is_done());
    }

    #[tokio::test]
    async fn test_records_requests() {
        let provider = MockProvider::new();
        provider
            .chat_completion(params("a", false), "key-1")
            .await
            .unwrap();
        let _ = provider
            .chat_completion_stream(params("b", true), "key-2")
            .await
            .unwrap();

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].params.model, "a");
        assert_eq!(requests[0].api_key, "key-1");
        assert_eq!(requests[1].params.stream, Some(true));
        assert_eq!(requests[1].api_key, "key-2");
    }

    #[tokio::test]
    async fn test_no_choices_template() {
        let provider = MockProvider::new();
        provider
            .set_default_response(ResponseTemplate::no_choices())
            .await;

        let response = provider
            .chat_completion(params("m", false), "key")
            .await
            .unwrap();
        assert!(response.choices.is_empty());
    }

    #[tokio::test]
    async fn test_error_override_and_expectation_error() {
        let provider = MockProvider::new();
        provider
            .when(RequestMatcher::Model("bad".to_string()))
            .respond_with_error(CompletionError::HttpError {
                status_code: 404,
                message: "model not found".to_string(),
            })
            .await;

        let err = provider
            .chat_completion(params("bad", false), "key")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));

        provider
            .set_error_override(Some(CompletionError::CompletionError("down".to_string())))
            .await;
        let result = provider.chat_completion_stream(params("ok", true), "key").await;
        assert!(matches!(result, Err(CompletionError::CompletionError(_))));
    }

    #[tokio::test]
    async fn test_stream_error_after_chunks() {
        let provider = MockProvider::new();
        provider
            .set_default_response(ResponseTemplate::new("one two three").with_error_after(1))
            .await;

        let events: Vec<_> = provider
            .chat_completion_stream(params("m", true), "key")
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert!(matches!(events[1], Err(CompletionError::StreamError(_))));
    }
}
