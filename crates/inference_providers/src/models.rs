use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Delta message in streaming chat completions
/// All fields are optional as they may not be present in every chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Parameters for chat completion requests (matches OpenAI API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionParams {
    /// Model ID to use for the completion
    pub model: String,

    /// List of messages comprising the conversation so far
    pub messages: Vec<ChatMessage>,

    /// Maximum number of tokens to generate; omitted means provider default (unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,

    /// Sampling temperature between 0 and 2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Whether to stream back partial progress
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    #[serde(flatten)]
    pub extra: std::collections::HashMap<String, serde_json::Value>,
}

impl ChatCompletionParams {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
            stream: None,
            extra: std::collections::HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub total_tokens: i32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: i32, completion_tokens: i32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Non-streaming chat completion response
///
/// OpenAI-compatible gateways disagree on which metadata fields they send,
/// so everything but `choices` is defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<ChatCompletionResponseChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponseChoice {
    #[serde(default)]
    pub index: i64,
    pub message: ChatResponseMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion streaming chunk (matches OpenAI format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Unique identifier for the completion
    #[serde(default)]
    pub id: String,

    /// Object type - always "chat.completion.chunk"
    #[serde(default)]
    pub object: String,

    /// Unix timestamp of when the chunk was created
    #[serde(default)]
    pub created: i64,

    /// Model used for the completion
    #[serde(default)]
    pub model: String,

    /// List of completion choices
    #[serde(default)]
    pub choices: Vec<ChatChoice>,

    /// Usage statistics (typically only in final chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Choice in a streaming chat completion chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<ChatDelta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum CompletionError {
    #[error("Failed to perform completion: {0}")]
    CompletionError(String),
    #[error("Provider returned HTTP {status_code}: {message}")]
    HttpError { status_code: u16, message: String },
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
    #[error("Stream interrupted: {0}")]
    StreamError(String),
}

impl CompletionError {
    /// Upstream HTTP status, when the provider answered with one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// The bare provider message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            Self::CompletionError(message)
            | Self::InvalidResponse(message)
            | Self::StreamError(message) => message,
            Self::HttpError { message, .. } => message,
        }
    }
}
