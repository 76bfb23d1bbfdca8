pub mod conversions;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;

use crate::{
    middleware::{provider_credential_middleware, CredentialState},
    openapi::ApiDoc,
    routes::{chat, health_check, HealthState},
};
use anyhow::Context;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use config::ApiConfig;
use inference_providers::{BackendConfig, InferenceProvider, OpenAiCompatibleProvider};
use services::{
    chat::ChatServiceTrait,
    completions::CompletionServiceTrait,
    web_search::{TavilyWebSearchProvider, WebSearchProviderTrait},
    ChatServiceImpl, CompletionServiceImpl,
};
use std::sync::Arc;
use utoipa::OpenApi;

pub use routes::AppState;

#[derive(Clone)]
pub struct DomainServices {
    pub chat_service: Arc<dyn ChatServiceTrait>,
    pub completion_service: Arc<dyn CompletionServiceTrait>,
    pub web_search_provider: Arc<dyn WebSearchProviderTrait>,
}

impl DomainServices {
    /// Wire the chat pipeline from an inference provider and a web search provider
    pub fn from_providers(
        inference_provider: Arc<dyn InferenceProvider>,
        web_search_provider: Arc<dyn WebSearchProviderTrait>,
    ) -> Self {
        let completion_service: Arc<dyn CompletionServiceTrait> =
            Arc::new(CompletionServiceImpl::new(inference_provider));
        let chat_service: Arc<dyn ChatServiceTrait> = Arc::new(ChatServiceImpl::new(
            completion_service.clone(),
            web_search_provider.clone(),
        ));

        Self {
            chat_service,
            completion_service,
            web_search_provider,
        }
    }
}

/// Build the OpenAI-compatible completion provider from configuration
pub fn init_inference_provider(config: &ApiConfig) -> anyhow::Result<Arc<dyn InferenceProvider>> {
    let provider_config = &config.completion_provider;
    tracing::info!(
        base_url = %provider_config.base_url,
        default_key = provider_config.api_key.is_some(),
        "Initializing completion provider"
    );

    let provider = OpenAiCompatibleProvider::new(BackendConfig::new(
        provider_config.base_url.clone(),
        provider_config.timeout_seconds,
    ))
    .context("Failed to create completion provider")?;
    Ok(Arc::new(provider))
}

/// Initialize all services used by the routes
pub fn init_domain_services(config: &ApiConfig) -> anyhow::Result<DomainServices> {
    let inference_provider = init_inference_provider(config)?;

    tracing::info!(endpoint = %config.web_search.endpoint, "Initializing web search provider");
    let web_search_provider = TavilyWebSearchProvider::new(&config.web_search)
        .context("Failed to create web search provider")?;

    Ok(DomainServices::from_providers(
        inference_provider,
        Arc::new(web_search_provider),
    ))
}

/// Build the complete application router
pub fn build_app(domain_services: DomainServices, config: &ApiConfig) -> Router {
    let app_state = AppState {
        chat_service: domain_services.chat_service,
    };
    let credential_state = CredentialState::new(config.completion_provider.api_key.clone());

    Router::new()
        .merge(build_chat_routes(app_state, credential_state))
        .merge(build_health_routes(HealthState::from_config(config)))
        .merge(build_openapi_routes())
}

/// Build chat routes behind the provider credential middleware
pub fn build_chat_routes(app_state: AppState, credential_state: CredentialState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .with_state(app_state)
        .layer(from_fn_with_state(
            credential_state,
            provider_credential_middleware,
        ))
}

pub fn build_health_routes(health_state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(health_state)
}

/// Build OpenAPI documentation routes
pub fn build_openapi_routes() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}
