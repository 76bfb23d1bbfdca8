use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use super::context::compose;
use super::errors::PipelineError;
use super::multiplexer::{encode_metadata_frame, MultiplexStream};
use super::ports::{ChatPipelineRequest, ChatServiceTrait, ChatStream};
use super::query::derive_search_query;
use super::state::{PipelineRun, PipelineState};
use crate::completions::{CompletionRequest, CompletionServiceTrait};
use crate::web_search::WebSearchProviderTrait;

/// Runs one chat request through query derivation, web search and the final completion
pub struct ChatServiceImpl {
    completion_service: Arc<dyn CompletionServiceTrait>,
    web_search_provider: Arc<dyn WebSearchProviderTrait>,
}

impl ChatServiceImpl {
    pub fn new(
        completion_service: Arc<dyn CompletionServiceTrait>,
        web_search_provider: Arc<dyn WebSearchProviderTrait>,
    ) -> Self {
        Self {
            completion_service,
            web_search_provider,
        }
    }

    async fn stream_with_web_search(
        &self,
        mut run: PipelineRun,
        request: ChatPipelineRequest,
        api_key: String,
    ) -> Result<ChatStream, PipelineError> {
        let ChatPipelineRequest {
            settings, messages, ..
        } = request;

        run.advance(PipelineState::DerivingQuery);
        let last_message = messages
            .last()
            .map(|message| message.content.as_str())
            .unwrap_or_default();
        let query = derive_search_query(
            self.completion_service.as_ref(),
            last_message,
            &settings,
            &api_key,
        )
        .await
        .map_err(|e| run.fail(e))?;
        tracing::info!(run_id = %run.id(), "Generated search query: {}", query);

        run.advance(PipelineState::Searching);
        let search_result = self
            .web_search_provider
            .search(query)
            .await
            .map_err(|e| run.fail(PipelineError::from(e)))?;

        run.advance(PipelineState::Composing);
        let augmented = compose(&messages, &search_result)
            .ok_or_else(|| run.fail(PipelineError::Unknown))?;
        let frame = encode_metadata_frame(&search_result).map_err(|e| {
            tracing::error!(run_id = %run.id(), "Failed to encode search metadata: {}", e);
            run.fail(PipelineError::Unknown)
        })?;

        run.advance(PipelineState::Completing);
        let upstream = self
            .completion_service
            .complete_stream(CompletionRequest::for_settings(
                &settings, augmented, api_key,
            ))
            .await
            .map_err(|e| run.fail(PipelineError::completion_streaming(&e)))?;

        run.advance(PipelineState::Streaming);
        let upstream = upstream.map(|item| {
            item.map(|event| event.raw_bytes)
                .map_err(|e| PipelineError::completion_streaming(&e))
        });
        Ok(Box::pin(
            MultiplexStream::new(upstream, Some(frame)).with_run(run),
        ))
    }

    async fn stream_direct(
        &self,
        mut run: PipelineRun,
        request: ChatPipelineRequest,
        api_key: String,
    ) -> Result<ChatStream, PipelineError> {
        run.advance(PipelineState::Completing);
        let upstream = self
            .completion_service
            .complete_stream(CompletionRequest::for_settings(
                &request.settings,
                request.messages,
                api_key,
            ))
            .await
            .map_err(|e| run.fail(PipelineError::provider(&e)))?;

        run.advance(PipelineState::Streaming);
        let upstream = upstream.map(|item| {
            item.map(|event| event.raw_bytes)
                .map_err(|e| PipelineError::provider(&e))
        });
        Ok(Box::pin(MultiplexStream::passthrough(upstream).with_run(run)))
    }
}

#[async_trait]
impl ChatServiceTrait for ChatServiceImpl {
    async fn stream_chat(&self, request: ChatPipelineRequest) -> Result<ChatStream, PipelineError> {
        let mut run = PipelineRun::new();

        let Some(api_key) = request
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
        else {
            return Err(run.fail(PipelineError::MissingApiKey));
        };

        tracing::debug!(
            run_id = %run.id(),
            model = %request.settings.model,
            messages = request.messages.len(),
            web_search = request.web_search_enabled,
            "Starting chat pipeline"
        );

        if request.web_search_enabled && !request.messages.is_empty() {
            self.stream_with_web_search(run, request, api_key).await
        } else {
            self.stream_direct(run, request, api_key).await
        }
    }
}
