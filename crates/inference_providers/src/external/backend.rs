//! Connection settings for external providers

/// Configuration for a backend connection
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL for the provider API
    pub base_url: String,
    /// Request timeout in seconds for non-streaming calls
    pub timeout_seconds: i64,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>, timeout_seconds: i64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_seconds,
        }
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_seconds: 120,
        }
    }
}
