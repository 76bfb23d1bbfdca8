use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub chat_settings: ChatSettingsRequest,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub is_web_search_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettingsRequest {
    /// Provider model id, e.g. `openai/gpt-4o-mini`
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Accepted but not forwarded; output limits are chosen per model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_profile_context: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_workspace_instructions: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn default_temperature() -> f32 {
    1.0
}
