pub mod ports;

use crate::chat::ports::{ChatMessage, ChatRole};
use inference_providers::{
    ChatCompletionParams, ChatCompletionResponse, CompletionError, InferenceProvider,
    MessageRole, StreamingResult,
};
use std::sync::Arc;

pub struct CompletionServiceImpl {
    pub inference_provider: Arc<dyn InferenceProvider>,
}

impl CompletionServiceImpl {
    pub fn new(inference_provider: Arc<dyn InferenceProvider>) -> Self {
        Self { inference_provider }
    }

    /// Convert pipeline messages to chat messages for inference providers
    fn prepare_chat_messages(messages: &[ChatMessage]) -> Vec<inference_providers::ChatMessage> {
        messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    ChatRole::System => MessageRole::System,
                    ChatRole::Assistant => MessageRole::Assistant,
                    ChatRole::User => MessageRole::User,
                };
                inference_providers::ChatMessage::new(role, msg.content.clone())
            })
            .collect()
    }

    fn prepare_params(request: &ports::CompletionRequest, stream: bool) -> ChatCompletionParams {
        let mut params = ChatCompletionParams::new(
            request.model.clone(),
            Self::prepare_chat_messages(&request.messages),
        );
        params.max_tokens = request.max_tokens;
        params.temperature = request.temperature;
        params.stream = Some(stream);
        params
    }
}

#[async_trait::async_trait]
impl ports::CompletionServiceTrait for CompletionServiceImpl {
    async fn complete(
        &self,
        request: ports::CompletionRequest,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        let params = Self::prepare_params(&request, false);
        tracing::debug!(
            model = %params.model,
            messages = params.messages.len(),
            max_tokens = ?params.max_tokens,
            "Requesting chat completion"
        );

        self.inference_provider
            .chat_completion(params, &request.api_key)
            .await
    }

    async fn complete_stream(
        &self,
        request: ports::CompletionRequest,
    ) -> Result<StreamingResult, CompletionError> {
        let params = Self::prepare_params(&request, true);
        tracing::debug!(
            model = %params.model,
            messages = params.messages.len(),
            max_tokens = ?params.max_tokens,
            "Requesting streaming chat completion"
        );

        self.inference_provider
            .chat_completion_stream(params, &request.api_key)
            .await
    }
}

pub use ports::*;
