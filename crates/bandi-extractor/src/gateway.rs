//! Async wrappers around the synchronous ports
//!
//! Providers and retrievers are blocking, so every call runs on the
//! blocking pool and is bounded by the per-call timeout. A call that times
//! out keeps running on its thread; its result is discarded.

use crate::error::ExtractorError;
use bandi_domain::traits::{FragmentRetriever, LlmProvider};
use bandi_domain::Fragment;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

async fn run_blocking<T, F>(limit: Duration, call: F) -> Result<T, ExtractorError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ExtractorError> + Send + 'static,
{
    timeout(limit, tokio::task::spawn_blocking(call))
        .await
        .map_err(|_| ExtractorError::Timeout(limit))?
        .map_err(|e| ExtractorError::TaskJoin(e.to_string()))?
}

/// Timed access to an [`LlmProvider`]
pub(crate) struct LlmGateway<L> {
    provider: Arc<L>,
    call_timeout: Duration,
}

impl<L> Clone for LlmGateway<L> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            call_timeout: self.call_timeout,
        }
    }
}

impl<L> LlmGateway<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    pub(crate) fn new(provider: Arc<L>, call_timeout: Duration) -> Self {
        Self {
            provider,
            call_timeout,
        }
    }

    pub(crate) fn model_name(&self) -> String {
        self.provider.model_name().to_string()
    }

    /// Send one prompt
    pub(crate) async fn generate(&self, prompt: String) -> Result<String, ExtractorError> {
        let provider = Arc::clone(&self.provider);
        run_blocking(self.call_timeout, move || {
            provider
                .generate(&prompt)
                .map_err(|e| ExtractorError::Llm(e.to_string()))
        })
        .await
    }
}

/// Timed access to a [`FragmentRetriever`]
pub(crate) struct RetrievalGateway<R> {
    retriever: Arc<R>,
    call_timeout: Duration,
}

impl<R> Clone for RetrievalGateway<R> {
    fn clone(&self) -> Self {
        Self {
            retriever: Arc::clone(&self.retriever),
            call_timeout: self.call_timeout,
        }
    }
}

impl<R> RetrievalGateway<R>
where
    R: FragmentRetriever + Send + Sync + 'static,
    R::Error: Display,
{
    pub(crate) fn new(retriever: Arc<R>, call_timeout: Duration) -> Self {
        Self {
            retriever,
            call_timeout,
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.retriever.is_ready()
    }

    pub(crate) async fn search(&self, query: &str, k: usize) -> Result<Vec<Fragment>, ExtractorError> {
        let retriever = Arc::clone(&self.retriever);
        let query = query.to_string();
        run_blocking(self.call_timeout, move || {
            retriever
                .similarity_search(&query, k)
                .map_err(|e| ExtractorError::Retrieval(e.to_string()))
        })
        .await
    }

    pub(crate) async fn fragments_for_source(
        &self,
        source_id: &str,
    ) -> Result<Option<Vec<Fragment>>, ExtractorError> {
        let retriever = Arc::clone(&self.retriever);
        let source_id = source_id.to_string();
        run_blocking(self.call_timeout, move || {
            retriever
                .fragments_for_source(&source_id)
                .map_err(|e| ExtractorError::Retrieval(e.to_string()))
        })
        .await
    }
}
