//! Error types for the Extractor

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during extraction
///
/// Only [`RetrievalUnavailable`](Self::RetrievalUnavailable) and
/// [`ReconstructionEmpty`](Self::ReconstructionEmpty) abort a run. The
/// others are recovered inside the pipeline: a field becomes unspecified or
/// a best-effort step is skipped.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Retrieval backend is not initialized
    #[error("Retrieval backend is not initialized")]
    RetrievalUnavailable,

    /// No fragment matched the requested source
    #[error("No fragments found for source '{0}'")]
    ReconstructionEmpty(String),

    /// No document matched a business description
    #[error("No document matches the description")]
    DocumentNotFound,

    /// Retrieval backend error
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// A collaborator call exceeded its time budget
    #[error("Call timed out after {0:?}")]
    Timeout(Duration),

    /// Model response does not have the expected shape
    #[error("Response parse mismatch: {0}")]
    ParseMismatch(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task panicked or was dropped
    #[error("Task join error: {0}")]
    TaskJoin(String),
}

impl ExtractorError {
    /// Whether this error aborts a whole extraction run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExtractorError::RetrievalUnavailable | ExtractorError::ReconstructionEmpty(_)
        )
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::ParseMismatch(e.to_string())
    }
}
