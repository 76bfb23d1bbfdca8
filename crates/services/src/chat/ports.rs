use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

use super::errors::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One conversation turn. Order within a request is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Model settings for one request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f32,
    /// Accepted for compatibility; the output limit is derived from the model
    pub max_output_tokens: Option<i64>,
    pub context_length: Option<i64>,
    pub prompt: Option<String>,
    pub embeddings_provider: Option<String>,
    pub include_profile_context: Option<bool>,
    pub include_workspace_instructions: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ChatPipelineRequest {
    pub settings: ChatSettings,
    pub messages: Vec<ChatMessage>,
    pub web_search_enabled: bool,
    /// Resolved provider credential, if any
    pub api_key: Option<String>,
}

/// Response body stream: an optional metadata line followed by the provider's raw bytes
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<Bytes, PipelineError>> + Send>>;

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait ChatServiceTrait: Send + Sync {
    /// Run the pipeline up to the point where the answer starts streaming.
    ///
    /// Errors returned here happen before any byte is produced and carry an HTTP
    /// status. Errors inside the stream abort a response that has already started.
    async fn stream_chat(&self, request: ChatPipelineRequest) -> Result<ChatStream, PipelineError>;
}
