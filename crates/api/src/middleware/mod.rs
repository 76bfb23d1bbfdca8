// API Middleware
//
// This module contains custom middleware for the API layer.

pub mod auth;

// Re-export commonly used items
pub use auth::{provider_credential_middleware, CredentialState, ProviderCredential};
