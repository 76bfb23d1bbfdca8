use serde::Deserialize;
use std::{collections::HashMap, env};

pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_WEB_SEARCH_ENDPOINT: &str = "https://api.tavily.com/search";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub completion_provider: CompletionProviderConfig,
    pub web_search: WebSearchConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            completion_provider: CompletionProviderConfig::from_env()?,
            web_search: WebSearchConfig::from_env()?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| "SERVER_PORT must be a valid port number")?,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Logging Configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub modules: HashMap<String, String>,
}

impl LoggingConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        let mut modules = HashMap::new();

        // Load module-specific log levels
        if let Ok(level) = env::var("LOG_MODULE_API") {
            modules.insert("api".to_string(), level);
        }
        if let Ok(level) = env::var("LOG_MODULE_SERVICES") {
            modules.insert("services".to_string(), level);
        }
        if let Ok(level) = env::var("LOG_MODULE_INFERENCE_PROVIDERS") {
            modules.insert("inference_providers".to_string(), level);
        }

        Ok(Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            modules,
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut modules = HashMap::new();
        modules.insert("api".to_string(), "debug".to_string());
        modules.insert("services".to_string(), "debug".to_string());

        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            modules,
        }
    }
}

/// OpenAI-compatible chat completion provider (OpenRouter by default)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionProviderConfig {
    pub base_url: String,
    /// Fallback key used when the caller does not supply one
    pub api_key: Option<String>,
    pub timeout_seconds: i64,
}

impl CompletionProviderConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            base_url: env::var("COMPLETION_PROVIDER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_BASE_URL.to_string()),
            api_key: env::var("OPENROUTER_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout_seconds: env::var("COMPLETION_PROVIDER_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .map_err(|_| "COMPLETION_PROVIDER_TIMEOUT_SECONDS must be a valid number")?,
        })
    }
}

impl Default for CompletionProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            api_key: None,
            timeout_seconds: 120,
        }
    }
}

/// Tavily web search provider
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: i64,
}

impl WebSearchConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            endpoint: env::var("WEB_SEARCH_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_WEB_SEARCH_ENDPOINT.to_string()),
            api_key: env::var("TAVILY_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout_seconds: env::var("WEB_SEARCH_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| "WEB_SEARCH_TIMEOUT_SECONDS must be a valid number")?,
        })
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_WEB_SEARCH_ENDPOINT.to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}
