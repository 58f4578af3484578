//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction error
    #[error("Extraction error: {0}")]
    Extractor(#[from] bandi_extractor::ExtractorError),

    /// LLM provider error
    #[error("Provider error: {0}")]
    Llm(#[from] bandi_llm::LlmError),

    /// Fragment index or record store error
    #[error("Store error: {0}")]
    Store(#[from] bandi_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),

    /// The run outlived both waits
    #[error("Extraction run {run_id} for '{source_id}' did not finish in time")]
    StillRunning {
        /// Run identifier
        run_id: String,
        /// Source being extracted
        source_id: String,
    },
}
