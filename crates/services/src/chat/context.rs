//! Builds the augmented message sequence for the final answer.

use super::ports::ChatMessage;
use crate::web_search::WebSearchResult;

/// Render sources as numbered blocks the model can cite
pub fn build_search_context(result: &WebSearchResult) -> String {
    result
        .sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            format!(
                "Source {} ({}):\n{}\nURL: {}",
                i + 1,
                source.title,
                source.content,
                source.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn synthesis_instruction(question: &str, context: &str) -> String {
    format!(
        "You are a helpful AI assistant. The user asked: \"{question}\". You have performed a \
         web search and found the following information. Please synthesize this information \
         and provide a comprehensive answer to the user's question, citing the sources \
         (Source 1, Source 2, etc.) where appropriate. \n\nWeb Search Results:\n{context}"
    )
}

/// History minus the last turn, then the synthesis instruction, then the last turn again.
///
/// Returns `None` for an empty conversation.
pub fn compose(messages: &[ChatMessage], result: &WebSearchResult) -> Option<Vec<ChatMessage>> {
    let (last, history) = messages.split_last()?;

    let instruction = synthesis_instruction(&last.content, &build_search_context(result));
    let mut composed = Vec::with_capacity(messages.len() + 1);
    composed.extend_from_slice(history);
    composed.push(ChatMessage::system(instruction));
    composed.push(last.clone());
    Some(composed)
}
