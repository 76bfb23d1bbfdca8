#![allow(dead_code)]

use api::{build_app, DomainServices};
use config::{ApiConfig, CompletionProviderConfig, LoggingConfig, ServerConfig, WebSearchConfig};
use inference_providers::mock::{RequestMatcher, ResponseTemplate};
use inference_providers::MockProvider;
use services::web_search::{
    MockWebSearchProviderTrait, WebSearchImage, WebSearchResult, WebSearchSource,
};
use std::sync::Arc;

pub const CALLER_KEY: &str = "sk-or-v1-caller";
pub const DEFAULT_KEY: &str = "sk-or-v1-default";

pub const AUTH_MESSAGE: &str =
    "Provider API key not found. Please set it in your profile settings.";

/// Provider stream replayed by the mock provider, keep-alive comment included
pub const UPSTREAM: [&str; 4] = [
    ": OPENROUTER PROCESSING\n\n",
    "data: {\"id\":\"gen-1\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Rust 1.80\"}}]}\n\n",
    "data: {\"id\":\"gen-1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\" stabilized LazyLock [Source 1].\"},\"finish_reason\":\"stop\"}]}\n\n",
    "data: [DONE]\n\n",
];

/// Helper function to create a test configuration
pub fn test_config(
    completion_base_url: &str,
    web_search_endpoint: &str,
    default_key: Option<&str>,
) -> ApiConfig {
    ApiConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "compact".to_string(),
            modules: std::collections::HashMap::new(),
        },
        completion_provider: CompletionProviderConfig {
            base_url: completion_base_url.to_string(),
            api_key: default_key.map(str::to_string),
            timeout_seconds: 10,
        },
        web_search: WebSearchConfig {
            endpoint: web_search_endpoint.to_string(),
            api_key: Some("tvly-test".to_string()),
            timeout_seconds: 10,
        },
    }
}

pub fn search_result(query: String) -> WebSearchResult {
    WebSearchResult {
        sources: vec![
            WebSearchSource {
                title: "Announcing Rust 1.80.0".to_string(),
                url: "https://blog.rust-lang.org/2024/07/25/Rust-1.80.0.html".to_string(),
                content: "LazyCell and LazyLock are stable.".to_string(),
            },
            WebSearchSource {
                title: "Rust Release Notes".to_string(),
                url: "https://doc.rust-lang.org/releases.html".to_string(),
                content: "Exclusive ranges in patterns.".to_string(),
            },
        ],
        images: vec![WebSearchImage {
            url: "https://www.rust-lang.org/logos/rust-logo.png".to_string(),
            description: "Rust logo".to_string(),
        }],
        query,
    }
}

/// A search mock answering every query with [`search_result`]
pub fn answering_search() -> MockWebSearchProviderTrait {
    let mut search = MockWebSearchProviderTrait::new();
    search
        .expect_search()
        .returning(|query| Ok(search_result(query)));
    search
}

/// Mock provider answering query derivation with `query` and streaming [`UPSTREAM`]
pub async fn scripted_provider(query: &str) -> Arc<MockProvider> {
    let provider = Arc::new(MockProvider::new());
    provider
        .when(RequestMatcher::NonStreaming)
        .respond_with(ResponseTemplate::new(query))
        .await;
    provider
        .when(RequestMatcher::Streaming)
        .respond_with(ResponseTemplate::raw_stream(UPSTREAM.to_vec()))
        .await;
    provider
}

/// Build a test server around in-process providers
pub fn setup_test_server(
    provider: Arc<MockProvider>,
    search: MockWebSearchProviderTrait,
    default_key: Option<&str>,
) -> axum_test::TestServer {
    let config = test_config("http://127.0.0.1:9", "http://127.0.0.1:9/search", default_key);
    let domain_services = DomainServices::from_providers(provider, Arc::new(search));
    let app = build_app(domain_services, &config);
    axum_test::TestServer::new(app).unwrap()
}

pub fn chat_body(web_search: bool, model: &str) -> serde_json::Value {
    serde_json::json!({
        "chatSettings": {
            "model": model,
            "temperature": 0.5,
            "contextLength": 4096,
            "includeProfileContext": false,
            "includeWorkspaceInstructions": false,
            "embeddingsProvider": "openai"
        },
        "messages": [
            {"role": "system", "content": "You are a helpful assistant."},
            {"role": "user", "content": "What is new in Rust 1.80?"}
        ],
        "isWebSearchEnabled": web_search
    })
}

/// Split a response body into the metadata line and the rest
pub fn split_metadata(body: &str) -> (serde_json::Value, &str) {
    let (line, rest) = body
        .split_once('\n')
        .expect("body should contain a metadata line");
    (
        serde_json::from_str(line).expect("metadata line should be JSON"),
        rest,
    )
}
