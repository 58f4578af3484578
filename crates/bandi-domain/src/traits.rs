//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction pipeline and
//! infrastructure. Implementations live in other crates.

use crate::Fragment;

/// Trait for retrieving indexed document fragments
///
/// Implemented by the infrastructure layer (bandi-store) or by an adapter
/// over an external vector index. How similarity is ranked is entirely up to
/// the implementation.
pub trait FragmentRetriever {
    /// Error type for retrieval operations
    type Error;

    /// Whether the backing index is initialized and can answer queries
    fn is_ready(&self) -> bool {
        true
    }

    /// Return up to `k` fragments ranked by relevance to `query`
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Fragment>, Self::Error>;

    /// Return every fragment of one source, if the backend supports it
    ///
    /// `Ok(None)` means the backend cannot list by source and callers must
    /// fall back to a broad [`similarity_search`](Self::similarity_search).
    fn fragments_for_source(&self, source_id: &str) -> Result<Option<Vec<Fragment>>, Self::Error> {
        let _ = source_id;
        Ok(None)
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (bandi-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Name of the underlying model, for run metadata
    fn model_name(&self) -> &str {
        "llm"
    }
}
