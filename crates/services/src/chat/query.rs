use super::errors::PipelineError;
use super::ports::{ChatMessage, ChatSettings};
use crate::completions::{CompletionRequest, CompletionServiceTrait};

const QUERY_TEMPERATURE: f32 = 0.1;
const QUERY_MAX_TOKENS: i64 = 50;

/// Instruction asking the model to turn the user's message into a search query
pub fn search_query_prompt(user_message: &str) -> String {
    format!(
        "You are an AI assistant. Your task is to generate a concise and effective search query \
         based on the user's last message. Return only the search query itself, with no \
         additional text or explanation.\nUser's message: \"{user_message}\"\nSearch Query:"
    )
}

/// Ask the completion provider for a web search query derived from `user_message`.
///
/// An empty answer is fatal for the run; there is no fallback to the raw message.
pub async fn derive_search_query(
    completion_service: &dyn CompletionServiceTrait,
    user_message: &str,
    settings: &ChatSettings,
    api_key: &str,
) -> Result<String, PipelineError> {
    let request = CompletionRequest {
        model: settings.model.clone(),
        messages: vec![ChatMessage::system(search_query_prompt(user_message))],
        max_tokens: Some(QUERY_MAX_TOKENS),
        temperature: Some(QUERY_TEMPERATURE),
        api_key: api_key.to_string(),
    };

    let response = completion_service
        .complete(request)
        .await
        .map_err(|e| PipelineError::provider(&e))?;

    let query = response
        .first_content()
        .map(str::trim)
        .unwrap_or_default();
    if query.is_empty() {
        return Err(PipelineError::QueryGenerationFailed);
    }

    Ok(query.to_string())
}
