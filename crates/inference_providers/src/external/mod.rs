//! External provider module for third-party chat completion APIs
//!
//! Only the OpenAI wire format is spoken here. OpenRouter, OpenAI itself, Together,
//! Groq and friends all accept it, so one implementation covers them.
//!
//! ```text
//! OpenAiCompatibleProvider (implements InferenceProvider)
//!     ├── BackendConfig (base URL, timeout)
//!     └── reqwest::Client (pooled, shared across requests)
//! ```

pub mod backend;
pub mod openai_compatible;

pub use backend::BackendConfig;
pub use openai_compatible::OpenAiCompatibleProvider;
