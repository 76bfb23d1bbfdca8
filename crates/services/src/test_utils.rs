// Test utilities for services crate
#![cfg(test)]

use crate::web_search::{WebSearchImage, WebSearchResult, WebSearchSource};

/// A provider stream as OpenRouter sends it, keep-alive comment included
pub const UPSTREAM: [&str; 4] = [
    ": OPENROUTER PROCESSING\n\n",
    "data: {\"id\":\"gen-1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"}}]}\n\n",
    "data: {\"id\":\"gen-1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\" there\"},\"finish_reason\":\"stop\"}]}\n\n",
    "data: [DONE]\n\n",
];

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
            description: String::new(),
        }],
        query,
    }
}
