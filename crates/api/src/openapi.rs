use crate::models::*;
use crate::routes::health::HealthResponse;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Search Augmented Chat API",
        description = "Streams chat completions from an OpenAI-compatible provider, optionally grounded in live web search results.\n\n## Authentication\n\nSend your provider key as `Authorization: Bearer <key>`. When omitted, the server's configured default key is used.",
        version = "1.0.0",
        license(
            name = "MIT",
        )
    ),
    paths(
        crate::routes::chat::chat,
        crate::routes::health::health_check,
    ),
    components(
        schemas(
            ChatRequest, ChatSettingsRequest, Message, MessageRole, ErrorResponse,
            HealthResponse,
        ),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security configuration for OpenAPI
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            // Provider API key passed through to the completion provider
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
