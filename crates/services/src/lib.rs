pub mod chat;
pub mod completions;
pub mod web_search;

pub use chat::ChatServiceImpl;
pub use completions::CompletionServiceImpl;
pub use web_search::TavilyWebSearchProvider;

#[cfg(test)]
mod test_utils;
