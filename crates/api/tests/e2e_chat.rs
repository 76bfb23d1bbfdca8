// E2E tests for the chat route with in-process providers
mod common;

use common::*;

use inference_providers::mock::{RequestMatcher, ResponseTemplate};
use inference_providers::{CompletionError, MockProvider};
use services::web_search::{MockWebSearchProviderTrait, WebSearchError};
use std::sync::Arc;

#[tokio::test]
async fn test_web_search_streams_metadata_then_provider_bytes() {
    let provider = scripted_provider("rust 1.80 release notes").await;
    let server = setup_test_server(provider.clone(), answering_search(), None);

    let response = server
        .post("/api/chat")
        .add_header("Authorization", format!("Bearer {CALLER_KEY}"))
        .json(&chat_body(true, "openai/gpt-4o-mini"))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "text/event-stream"
    );

    let body = response.text();
    let (metadata, rest) = split_metadata(&body);
    assert_eq!(metadata["metadata"]["isWebSearch"], true);
    let sources = &metadata["metadata"]["webSearchSources"];
    assert_eq!(sources["query"], "rust 1.80 release notes");
    assert_eq!(sources["sources"][1]["url"], "https://doc.rust-lang.org/releases.html");
    assert_eq!(sources["images"][0]["description"], "Rust logo");
    assert_eq!(rest, UPSTREAM.concat());

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.api_key == CALLER_KEY));
    // history minus the question, the synthesis instruction, then the question again
    assert_eq!(requests[1].params.messages.len(), 3);
}

#[tokio::test]
async fn test_without_web_search_body_is_provider_bytes() {
    let provider = scripted_provider("unused").await;
    let mut search = MockWebSearchProviderTrait::new();
    search.expect_search().times(0);
    let server = setup_test_server(provider.clone(), search, None);

    let response = server
        .post("/api/chat")
        .add_header("Authorization", format!("Bearer {CALLER_KEY}"))
        .json(&chat_body(false, "openai/gpt-4o-mini"))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), UPSTREAM.concat());
    assert_eq!(provider.requests().await.len(), 1);
}

#[tokio::test]
async fn test_mistral_gets_fixed_output_limit() {
    let provider = scripted_provider("unused").await;
    let server = setup_test_server(provider.clone(), MockWebSearchProviderTrait::new(), None);

    let mut body = chat_body(false, "mistralai/mistral-7b-instruct");
    body["chatSettings"]["maxOutputTokens"] = serde_json::json!(777);
    server
        .post("/api/chat")
        .add_header("Authorization", format!("Bearer {CALLER_KEY}"))
        .json(&body)
        .await;

    let requests = provider.requests().await;
    assert_eq!(requests[0].params.max_tokens, Some(16000));
}

#[tokio::test]
async fn test_default_key_used_without_authorization_header() {
    let provider = scripted_provider("unused").await;
    let server = setup_test_server(
        provider.clone(),
        MockWebSearchProviderTrait::new(),
        Some(DEFAULT_KEY),
    );

    let response = server
        .post("/api/chat")
        .json(&chat_body(false, "openai/gpt-4o-mini"))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(provider.requests().await[0].api_key, DEFAULT_KEY);
}

#[tokio::test]
async fn test_missing_key_is_401() {
    let provider = Arc::new(MockProvider::new());
    let server = setup_test_server(provider.clone(), MockWebSearchProviderTrait::new(), None);

    let response = server
        .post("/api/chat")
        .json(&chat_body(true, "openai/gpt-4o-mini"))
        .await;

    assert_eq!(response.status_code(), 401);
    let err = response.json::<api::models::ErrorResponse>();
    assert_eq!(err.message, AUTH_MESSAGE);
    assert!(provider.requests().await.is_empty());
}

#[tokio::test]
async fn test_non_bearer_authorization_is_rejected() {
    let provider = Arc::new(MockProvider::new());
    let server = setup_test_server(provider.clone(), MockWebSearchProviderTrait::new(), None);

    let response = server
        .post("/api/chat")
        .add_header("Authorization", "Basic dXNlcjpwYXNz")
        .json(&chat_body(false, "openai/gpt-4o-mini"))
        .await;

    assert_eq!(response.status_code(), 401);
    assert!(provider.requests().await.is_empty());
}

#[tokio::test]
async fn test_provider_api_key_not_found_is_normalized() {
    let provider = Arc::new(MockProvider::new());
    provider
        .set_error_override(Some(CompletionError::HttpError {
            status_code: 401,
            message: "API key not found".to_string(),
        }))
        .await;
    let server = setup_test_server(provider, MockWebSearchProviderTrait::new(), None);

    let response = server
        .post("/api/chat")
        .add_header("Authorization", "Bearer sk-or-v1-revoked")
        .json(&chat_body(true, "openai/gpt-4o-mini"))
        .await;

    assert_eq!(response.status_code(), 401);
    let err = response.json::<api::models::ErrorResponse>();
    assert_eq!(err.message, AUTH_MESSAGE);
}

#[tokio::test]
async fn test_insufficient_funds_keeps_upstream_status() {
    let provider = Arc::new(MockProvider::new());
    provider
        .when(RequestMatcher::Streaming)
        .respond_with_error(CompletionError::HttpError {
            status_code: 429,
            message: "insufficient funds".to_string(),
        })
        .await;
    let server = setup_test_server(provider, MockWebSearchProviderTrait::new(), None);

    let response = server
        .post("/api/chat")
        .add_header("Authorization", format!("Bearer {CALLER_KEY}"))
        .json(&chat_body(false, "openai/gpt-4o-mini"))
        .await;

    assert_eq!(response.status_code(), 429);
    let err = response.json::<api::models::ErrorResponse>();
    assert_eq!(
        err.message,
        "You have insufficient funds in your provider account."
    );
}

#[tokio::test]
async fn test_search_failure_is_500() {
    let provider = scripted_provider("rust").await;
    let mut search = MockWebSearchProviderTrait::new();
    search
        .expect_search()
        .times(1)
        .returning(|_| Err(WebSearchError::RequestFailed("timeout".to_string())));
    let server = setup_test_server(provider.clone(), search, None);

    let response = server
        .post("/api/chat")
        .add_header("Authorization", format!("Bearer {CALLER_KEY}"))
        .json(&chat_body(true, "openai/gpt-4o-mini"))
        .await;

    assert_eq!(response.status_code(), 500);
    let err = response.json::<api::models::ErrorResponse>();
    assert_eq!(err.message, "Tavily search failed: timeout");
    // only the query derivation reached the provider
    assert_eq!(provider.requests().await.len(), 1);
}

#[tokio::test]
async fn test_invalid_search_shape_is_500() {
    let provider = scripted_provider("rust").await;
    let mut search = MockWebSearchProviderTrait::new();
    search
        .expect_search()
        .returning(|_| Err(WebSearchError::InvalidResultShape));
    let server = setup_test_server(provider, search, None);

    let response = server
        .post("/api/chat")
        .add_header("Authorization", format!("Bearer {CALLER_KEY}"))
        .json(&chat_body(true, "openai/gpt-4o-mini"))
        .await;

    assert_eq!(response.status_code(), 500);
    let err = response.json::<api::models::ErrorResponse>();
    assert_eq!(err.message, "Tavily returned invalid search results format.");
}

#[tokio::test]
async fn test_blank_query_fails_without_search() {
    let provider = Arc::new(MockProvider::new());
    provider
        .when(RequestMatcher::NonStreaming)
        .respond_with(ResponseTemplate::new("   "))
        .await;
    let mut search = MockWebSearchProviderTrait::new();
    search.expect_search().times(0);
    let server = setup_test_server(provider, search, None);

    let response = server
        .post("/api/chat")
        .add_header("Authorization", format!("Bearer {CALLER_KEY}"))
        .json(&chat_body(true, "openai/gpt-4o-mini"))
        .await;

    assert_eq!(response.status_code(), 500);
    let err = response.json::<api::models::ErrorResponse>();
    assert_eq!(err.message, "Failed to generate search query from AI.");
}

#[tokio::test]
async fn test_malformed_body_rejected_before_pipeline() {
    let provider = Arc::new(MockProvider::new());
    let server = setup_test_server(provider.clone(), MockWebSearchProviderTrait::new(), None);

    let response = server
        .post("/api/chat")
        .add_header("Authorization", format!("Bearer {CALLER_KEY}"))
        .json(&serde_json::json!({"messages": []}))
        .expect_failure()
        .await;

    assert!(response.status_code().is_client_error());
    assert!(provider.requests().await.is_empty());
}

#[tokio::test]
async fn test_health_and_openapi() {
    let server = setup_test_server(
        Arc::new(MockProvider::new()),
        MockWebSearchProviderTrait::new(),
        None,
    );

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), 200);
    let health = health.json::<serde_json::Value>();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["webSearchConfigured"], true);
    assert_eq!(health["defaultProviderKey"], false);

    let doc = server.get("/api-docs/openapi.json").await;
    assert_eq!(doc.status_code(), 200);
    assert!(doc.json::<serde_json::Value>()["paths"]["/api/chat"].is_object());
}
