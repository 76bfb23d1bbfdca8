use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::models::ErrorResponse;

/// Provider credential resolved for the current request, passed to route handlers
#[derive(Clone, Debug)]
pub struct ProviderCredential(pub Option<String>);

/// State for the credential middleware
#[derive(Clone, Default)]
pub struct CredentialState {
    /// Used when the caller does not send their own key
    pub default_provider_key: Option<String>,
}

impl CredentialState {
    pub fn new(default_provider_key: Option<String>) -> Self {
        Self {
            default_provider_key: default_provider_key.filter(|key| !key.trim().is_empty()),
        }
    }
}

fn unauthorized(message: &str) -> (StatusCode, axum::Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(ErrorResponse::new(message)),
    )
}

/// Resolve the caller's provider key from `Authorization: Bearer <key>`, falling back to
/// the configured default. A missing key is not rejected here; the pipeline reports it.
pub async fn provider_credential_middleware(
    State(state): State<CredentialState>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, axum::Json<ErrorResponse>)> {
    let supplied = match request.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => {
            let Ok(value) = value.to_str() else {
                debug!("Authorization header is not valid UTF-8");
                return Err(unauthorized("Invalid authorization header"));
            };
            let Some(token) = value.strip_prefix("Bearer ") else {
                debug!("Authorization header does not start with 'Bearer '");
                return Err(unauthorized(
                    "Authorization header does not start with 'Bearer '",
                ));
            };
            let token = token.trim();
            if token.is_empty() {
                return Err(unauthorized("Empty bearer token"));
            }
            Some(token.to_string())
        }
    };

    let credential = match supplied {
        Some(key) => {
            debug!("Using caller supplied provider key");
            Some(key)
        }
        None if state.default_provider_key.is_some() => {
            debug!("Using configured default provider key");
            state.default_provider_key.clone()
        }
        None => {
            debug!("No provider key available for request");
            None
        }
    };

    request
        .extensions_mut()
        .insert(ProviderCredential(credential));
    Ok(next.run(request).await)
}
