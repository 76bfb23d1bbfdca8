use axum::{extract::State, http::StatusCode, response::Json as ResponseJson};
use config::ApiConfig;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which credentials the service was started with. Keys themselves are never exposed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthState {
    pub web_search_configured: bool,
    pub default_provider_key: bool,
}

impl HealthState {
    pub fn from_config(config: &ApiConfig) -> Self {
        let present = |key: &Option<String>| key.as_deref().is_some_and(|k| !k.trim().is_empty());
        Self {
            web_search_configured: present(&config.web_search.api_key),
            default_provider_key: present(&config.completion_provider.api_key),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "ok" when every web search request can be served, "degraded" otherwise
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// A Tavily API key is configured
    pub web_search_configured: bool,
    /// Requests without an Authorization header fall back to a configured provider key
    pub default_provider_key: bool,
}

/// Health check endpoint
///
/// Requires no credentials. Reports "degraded" when web search requests would fail for
/// lack of a Tavily key; chat without web search still works in that state.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "Health"
)]
pub async fn health_check(
    State(state): State<HealthState>,
) -> (StatusCode, ResponseJson<HealthResponse>) {
    let status = if state.web_search_configured {
        "ok"
    } else {
        "degraded"
    };

    (
        StatusCode::OK,
        ResponseJson(HealthResponse {
            status: status.to_string(),
            version: option_env!("CARGO_PKG_VERSION").map(str::to_string),
            web_search_configured: state.web_search_configured,
            default_provider_key: state.default_provider_key,
        }),
    )
}
