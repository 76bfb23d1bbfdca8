// Conversions between HTTP models and service types

use crate::models::{ChatRequest, ChatSettingsRequest, Message, MessageRole};
use services::chat::{ChatMessage, ChatPipelineRequest, ChatRole, ChatSettings};

impl From<MessageRole> for ChatRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::System => ChatRole::System,
            MessageRole::User => ChatRole::User,
            MessageRole::Assistant => ChatRole::Assistant,
        }
    }
}

impl From<Message> for ChatMessage {
    fn from(message: Message) -> Self {
        ChatMessage::new(message.role.into(), message.content)
    }
}

impl From<ChatSettingsRequest> for ChatSettings {
    fn from(settings: ChatSettingsRequest) -> Self {
        ChatSettings {
            model: settings.model,
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            context_length: settings.context_length,
            prompt: settings.prompt,
            embeddings_provider: settings.embeddings_provider,
            include_profile_context: settings.include_profile_context,
            include_workspace_instructions: settings.include_workspace_instructions,
        }
    }
}

impl ChatRequest {
    /// Build the pipeline request, attaching the resolved provider credential
    pub fn into_pipeline_request(self, api_key: Option<String>) -> ChatPipelineRequest {
        ChatPipelineRequest {
            settings: self.chat_settings.into(),
            messages: self.messages.into_iter().map(Into::into).collect(),
            web_search_enabled: self.is_web_search_enabled,
            api_key,
        }
    }
}
