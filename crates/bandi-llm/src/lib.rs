//! Bandi LLM Provider Layer
//!
//! Pluggable LLM provider implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from `bandi-domain`.
//! It supports multiple LLM backends with a common interface.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `AzureOpenAiProvider`: Azure OpenAI chat completions
//!
//! # Examples
//!
//! ```
//! use bandi_llm::MockProvider;
//! use bandi_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Regione Lombardia");
//! let result = provider.generate("Chi eroga il bando?").unwrap();
//! assert_eq!(result, "Regione Lombardia");
//! ```

#![warn(missing_docs)]

pub mod azure;
mod http;
pub mod mock;
pub mod ollama;

use thiserror::Error;

pub use azure::AzureOpenAiProvider;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider is missing required configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}
