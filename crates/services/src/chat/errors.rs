use inference_providers::CompletionError;
use serde::Serialize;

use crate::web_search::WebSearchError;

const AUTHENTICATION_MESSAGE: &str =
    "Provider API key not found. Please set it in your profile settings.";
const INSUFFICIENT_FUNDS_MESSAGE: &str = "You have insufficient funds in your provider account.";

#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("Provider API key not found. Please set it in your profile settings.")]
    MissingApiKey,

    /// A provider call failed outside the final answer stream
    #[error("{message}")]
    Provider {
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to generate search query from AI.")]
    QueryGenerationFailed,

    #[error("Tavily search failed: {0}")]
    SearchProvider(String),

    #[error("Tavily returned invalid search results format.")]
    SearchResultShape,

    #[error("Final answer generation failed: {message}")]
    CompletionStreaming {
        status: Option<u16>,
        message: String,
    },

    #[error("An unexpected error occurred")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineErrorKind {
    AuthenticationError,
    InsufficientFundsError,
    QueryGenerationFailed,
    SearchProviderError,
    SearchResultShapeError,
    CompletionStreamingError,
    UnknownError,
}

/// Caller-facing form of a [`PipelineError`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub kind: PipelineErrorKind,
    pub message: String,
    pub http_status: u16,
}

impl PipelineError {
    /// Wrap a provider error from a call other than the final answer stream
    pub fn provider(error: &CompletionError) -> Self {
        Self::Provider {
            status: error.status_code(),
            message: error.message().to_string(),
        }
    }

    /// Wrap a provider error from the final answer stream
    pub fn completion_streaming(error: &CompletionError) -> Self {
        Self::CompletionStreaming {
            status: error.status_code(),
            message: error.message().to_string(),
        }
    }

    fn upstream(&self) -> Option<(Option<u16>, &str)> {
        match self {
            Self::Provider { status, message } | Self::CompletionStreaming { status, message } => {
                Some((*status, message.as_str()))
            }
            _ => None,
        }
    }

    /// Text markers are checked on the rendered message of every variant; status markers
    /// only exist for upstream provider errors.
    pub fn kind(&self) -> PipelineErrorKind {
        let lowered = self.to_string().to_lowercase();
        let status = self.upstream().and_then(|(status, _)| status);
        if lowered.contains("api key not found") || status == Some(401) {
            return PipelineErrorKind::AuthenticationError;
        }
        if lowered.contains("insufficient funds") || status == Some(402) {
            return PipelineErrorKind::InsufficientFundsError;
        }

        match self {
            Self::MissingApiKey => PipelineErrorKind::AuthenticationError,
            Self::Provider { .. } => PipelineErrorKind::UnknownError,
            Self::QueryGenerationFailed => PipelineErrorKind::QueryGenerationFailed,
            Self::SearchProvider(_) => PipelineErrorKind::SearchProviderError,
            Self::SearchResultShape => PipelineErrorKind::SearchResultShapeError,
            Self::CompletionStreaming { .. } => PipelineErrorKind::CompletionStreamingError,
            Self::Unknown => PipelineErrorKind::UnknownError,
        }
    }

    /// Upstream HTTP status when there is one; 401 for a missing credential; else 500
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingApiKey => 401,
            _ => self
                .upstream()
                .and_then(|(status, _)| status)
                .unwrap_or(500),
        }
    }

    /// Message shown to the caller
    pub fn user_message(&self) -> String {
        match self.kind() {
            PipelineErrorKind::AuthenticationError => AUTHENTICATION_MESSAGE.to_string(),
            PipelineErrorKind::InsufficientFundsError => INSUFFICIENT_FUNDS_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.user_message(),
            http_status: self.status_code(),
        }
    }
}

impl From<WebSearchError> for PipelineError {
    fn from(error: WebSearchError) -> Self {
        match error {
            WebSearchError::InvalidResultShape => Self::SearchResultShape,
            other => {
                let message = other.provider_message();
                if message.trim().is_empty() {
                    Self::SearchProvider("Unknown error".to_string())
                } else {
                    Self::SearchProvider(message)
                }
            }
        }
    }
}
