use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

/// One search-result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchSource {
    pub title: String,
    pub url: String,
    pub content: String,
}

/// An image returned alongside the search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchImage {
    pub url: String,
    /// Empty when the provider gave no description
    pub description: String,
}

/// Normalized outcome of one search
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WebSearchResult {
    pub sources: Vec<WebSearchSource>,
    pub images: Vec<WebSearchImage>,
    pub query: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WebSearchError {
    #[error("{0}")]
    RequestFailed(String),
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },
    #[error("{0}")]
    ResponseParsingFailed(String),
    #[error("search results are missing or not a list")]
    InvalidResultShape,
    #[error("web search API key is not configured")]
    MissingApiKey,
}

impl WebSearchError {
    /// The provider-facing message, without transport decoration
    pub fn provider_message(&self) -> String {
        match self {
            Self::HttpError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait WebSearchProviderTrait: Send + Sync {
    /// Run one search and normalize the provider's answer
    async fn search(&self, query: String) -> Result<WebSearchResult, WebSearchError>;
}
