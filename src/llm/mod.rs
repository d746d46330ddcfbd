//! # Generation client
//!
//! Talks to an OpenAI-compatible chat-completions provider and turns its
//! answer into a [`RawArtifact`]. Provider trouble never escapes this module
//! as an error: callers get an explicit [`Generation::Fallback`] carrying a
//! safe stand-in page and the cause.
//!
//! ```text
//! CompiledPrompt → directive.rs (system turn) → client.rs (POST) → cleanup.rs → RawArtifact
//!                                                     ↘ on failure → fallback.rs
//! ```

pub mod cleanup;
pub mod client;
pub mod directive;
pub mod fallback;
pub mod wire;

pub use client::ProviderClient;
pub use fallback::fallback_document;
pub use wire::{LLMRequest, LLMResponse, Message};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{CompiledPrompt, RawArtifact};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Request timeout - the API took too long to respond")]
    Timeout,
    #[error("Connection error - unable to reach the API: {0}")]
    Connect(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Authentication failed - check your API key")]
    Unauthorized,
    #[error("Access forbidden - insufficient permissions")]
    Forbidden,
    #[error("Rate limit exceeded - too many requests")]
    RateLimited,
    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse API response as JSON: {0}")]
    Decode(String),
    #[error("API returned empty response")]
    EmptyChoices,
    #[error("API returned empty content")]
    EmptyContent,
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl ProviderError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => ProviderError::Unauthorized,
            403 => ProviderError::Forbidden,
            429 => ProviderError::RateLimited,
            500..=599 => ProviderError::Server { status, body },
            _ => ProviderError::Status { status, body },
        }
    }
}

/// What a generator produced for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Completed(RawArtifact),
    Fallback {
        artifact: RawArtifact,
        cause: ProviderError,
    },
}

impl Generation {
    pub fn fallback(prompt: &CompiledPrompt, framework_url: &str, cause: ProviderError) -> Self {
        Generation::Fallback {
            artifact: fallback_document(prompt, framework_url),
            cause,
        }
    }

    pub fn artifact(&self) -> &RawArtifact {
        match self {
            Generation::Completed(artifact) => artifact,
            Generation::Fallback { artifact, .. } => artifact,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generation::Fallback { .. })
    }
}

/// Anything that can turn a compiled prompt into markup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &CompiledPrompt, category: &str, style: &str) -> Generation;
}

#[cfg(test)]
mod tests;
