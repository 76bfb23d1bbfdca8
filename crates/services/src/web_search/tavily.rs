pub use super::ports::*;
use config::WebSearchConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

static TAVILY_SEARCH_DEPTH: &str = "advanced";
const TAVILY_MAX_RESULTS: u32 = 8;

/// Tavily search client. Built once at start-up and shared across requests.
pub struct TavilyWebSearchProvider {
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl TavilyWebSearchProvider {
    pub fn new(config: &WebSearchConfig) -> Result<Self, WebSearchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| WebSearchError::RequestFailed(e.to_string()))?;

        if config.api_key.is_none() {
            tracing::warn!("TAVILY_API_KEY is not set; web search requests will fail");
        }

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_seconds.max(1) as u64),
            client,
        })
    }
}

/// Request body for Tavily's /search endpoint
#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    query: &'a str,
    search_depth: &'static str,
    max_results: u32,
    include_answer: bool,
    include_images: bool,
    include_image_descriptions: bool,
}

impl<'a> TavilySearchRequest<'a> {
    fn new(query: &'a str) -> Self {
        Self {
            query,
            search_depth: TAVILY_SEARCH_DEPTH,
            max_results: TAVILY_MAX_RESULTS,
            // The answer is never used downstream but keeps the response shape stable
            include_answer: true,
            include_images: true,
            include_image_descriptions: true,
        }
    }
}

/// Individual result item from the Tavily API
#[derive(Debug, Clone, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Images come back as bare URLs unless descriptions were requested
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TavilyImage {
    Url(String),
    Described {
        url: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<TavilyImage> for WebSearchImage {
    fn from(image: TavilyImage) -> Self {
        match image {
            TavilyImage::Url(url) => WebSearchImage {
                url,
                description: String::new(),
            },
            TavilyImage::Described { url, description } => WebSearchImage {
                url,
                description: description.unwrap_or_default(),
            },
        }
    }
}

/// Turn a raw Tavily response body into a [`WebSearchResult`].
///
/// `results` must be an array; anything else is a contract violation and is
/// reported instead of coerced. `images` is optional.
fn normalize_response(
    body: &serde_json::Value,
    query: &str,
) -> Result<WebSearchResult, WebSearchError> {
    let results = body
        .get("results")
        .and_then(|r| r.as_array())
        .ok_or(WebSearchError::InvalidResultShape)?;

    let sources = results
        .iter()
        .map(|item| {
            serde_json::from_value::<TavilyResult>(item.clone())
                .map(|result| WebSearchSource {
                    title: result.title,
                    url: result.url,
                    content: result.content,
                })
                .map_err(|_| WebSearchError::InvalidResultShape)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let images = body
        .get("images")
        .and_then(|i| i.as_array())
        .map(|images| {
            images
                .iter()
                .filter_map(|image| serde_json::from_value::<TavilyImage>(image.clone()).ok())
                .map(WebSearchImage::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(WebSearchResult {
        sources,
        images,
        query: query.to_string(),
    })
}

/// Tavily reports errors as `{"detail": {"error": "..."}}`; fall back to the raw body
fn extract_tavily_error(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed.as_ref().and_then(|json| {
        json.pointer("/detail/error")
            .or_else(|| json.get("detail"))
            .or_else(|| json.get("error"))
            .or_else(|| json.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });

    match message {
        Some(message) if !message.trim().is_empty() => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => "Unknown error".to_string(),
    }
}

#[async_trait::async_trait]
impl WebSearchProviderTrait for TavilyWebSearchProvider {
    async fn search(&self, query: String) -> Result<WebSearchResult, WebSearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(WebSearchError::MissingApiKey)?;

        tracing::debug!("Searching Tavily for query: {}", query);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&TavilySearchRequest::new(&query))
            .send()
            .await
            .map_err(|e| WebSearchError::RequestFailed(e.to_string()))?;

        // Check response status
        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::error!("Tavily API error (status {}): {}", status, error_body);
            return Err(WebSearchError::HttpError {
                status: status.as_u16(),
                message: extract_tavily_error(&error_body),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| WebSearchError::ResponseParsingFailed(e.to_string()))?;

        let body: serde_json::Value = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!("Failed to parse Tavily response: {}", e);
            WebSearchError::ResponseParsingFailed(format!("JSON parsing error: {e}"))
        })?;

        let result = normalize_response(&body, &query).inspect_err(|_| {
            tracing::error!("Tavily returned invalid search results format: {}", body);
        })?;

        tracing::debug!(
            "Found {} results and {} images",
            result.sources.len(),
            result.images.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_fixed_options() {
        let body = serde_json::to_value(TavilySearchRequest::new("rust async")).unwrap();

        assert_eq!(
            body,
            json!({
                "query": "rust async",
                "search_depth": "advanced",
                "max_results": 8,
                "include_answer": true,
                "include_images": true,
                "include_image_descriptions": true
            })
        );
    }

    #[test]
    fn test_normalize_preserves_order_and_defaults_descriptions() {
        let body = json!({
            "answer": "ignored",
            "results": [
                {"title": "First", "url": "https://a.example", "content": "alpha", "score": 0.9},
                {"title": "Second", "url": "https://b.example", "content": "beta"}
            ],
            "images": [
                {"url": "https://img.example/1.png", "description": "a crab"},
                {"url": "https://img.example/2.png"},
                {"url": "https://img.example/3.png", "description": null},
                "https://img.example/4.png"
            ]
        });

        let result = normalize_response(&body, "rust crab").unwrap();

        assert_eq!(result.query, "rust crab");
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].title, "First");
        assert_eq!(result.sources[1].url, "https://b.example");
        assert_eq!(result.images.len(), 4);
        assert_eq!(result.images[0].description, "a crab");
        assert_eq!(result.images[1].description, "");
        assert_eq!(result.images[2].description, "");
        assert_eq!(result.images[3].url, "https://img.example/4.png");
        assert_eq!(result.images[3].description, "");
    }

    #[test]
    fn test_normalize_without_images() {
        let body = json!({"results": []});
        let result = normalize_response(&body, "q").unwrap();

        assert!(result.sources.is_empty());
        assert!(result.images.is_empty());
    }

    #[test]
    fn test_normalize_rejects_non_array_results() {
        for body in [
            json!({"results": "not-an-array"}),
            json!({"results": null}),
            json!({"answer": "no results key"}),
            json!(null),
            json!([1, 2, 3]),
        ] {
            assert!(
                matches!(
                    normalize_response(&body, "q"),
                    Err(WebSearchError::InvalidResultShape)
                ),
                "expected shape error for {body}"
            );
        }
    }

    #[test]
    fn test_normalize_rejects_non_object_items() {
        let body = json!({"results": ["just a string"]});
        assert!(matches!(
            normalize_response(&body, "q"),
            Err(WebSearchError::InvalidResultShape)
        ));
    }

    #[test]
    fn test_extract_tavily_error() {
        assert_eq!(
            extract_tavily_error(r#"{"detail":{"error":"Unauthorized: missing or invalid API key."}}"#),
            "Unauthorized: missing or invalid API key."
        );
        assert_eq!(extract_tavily_error(r#"{"error":"rate limited"}"#), "rate limited");
        assert_eq!(extract_tavily_error("Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_tavily_error("   "), "Unknown error");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let provider = TavilyWebSearchProvider::new(&WebSearchConfig {
            endpoint: "http://127.0.0.1:9/search".to_string(),
            api_key: None,
            timeout_seconds: 1,
        })
        .unwrap();

        let err = provider.search("anything".to_string()).await.unwrap_err();
        assert!(matches!(err, WebSearchError::MissingApiKey));
    }
}
