use axum::{
    body::Body,
    extract::{Extension, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json as ResponseJson, Response},
    Json,
};
use services::chat::{ChatServiceTrait, PipelineError};
use std::sync::Arc;
use tracing::{debug, error};

use crate::{
    middleware::ProviderCredential,
    models::{ChatRequest, ErrorResponse},
};

#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<dyn ChatServiceTrait>,
}

/// Stream a chat answer, optionally augmented with web search results
///
/// With web search enabled the first line of the body is a JSON object
/// `{"metadata": {"webSearchSources": {...}, "isWebSearch": true}}`; the provider's
/// server-sent events follow unchanged.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer stream", content_type = "text/event-stream", body = String),
        (status = 401, description = "No provider API key available", body = ErrorResponse),
        (status = 402, description = "Insufficient provider funds", body = ErrorResponse),
        (status = 500, description = "Pipeline failure", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn chat(
    State(app_state): State<AppState>,
    Extension(credential): Extension<ProviderCredential>,
    Json(request): Json<ChatRequest>,
) -> Response {
    debug!(
        model = %request.chat_settings.model,
        messages = request.messages.len(),
        web_search = request.is_web_search_enabled,
        "Chat request received"
    );

    let pipeline_request = request.into_pipeline_request(credential.0);
    match app_state.chat_service.stream_chat(pipeline_request).await {
        Ok(stream) => (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(stream),
        )
            .into_response(),
        Err(e) => map_pipeline_error(&e).into_response(),
    }
}

fn map_pipeline_error(error: &PipelineError) -> (StatusCode, ResponseJson<ErrorResponse>) {
    let report = error.report();
    let status =
        StatusCode::from_u16(report.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error!(kind = ?report.kind, status = %status, "Chat pipeline failed: {}", error);
    (status, ResponseJson(ErrorResponse::new(report.message)))
}
