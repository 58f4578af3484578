//! Find the notice that best matches a business description

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::gateway::RetrievalGateway;
use crate::types::DocumentMatch;
use bandi_domain::traits::FragmentRetriever;
use bandi_domain::UNSPECIFIED;
use std::fmt::Display;
use std::sync::Arc;
use tracing::info;

/// Picks the source of the top-ranked fragment for a description
pub struct DocumentLocator<R> {
    retrieval: RetrievalGateway<R>,
}

impl<R> DocumentLocator<R>
where
    R: FragmentRetriever + Send + Sync + 'static,
    R::Error: Display,
{
    /// Create a locator
    pub fn new(retriever: Arc<R>, config: &ExtractorConfig) -> Self {
        Self::from_gateway(RetrievalGateway::new(retriever, config.call_timeout()))
    }

    pub(crate) fn from_gateway(retrieval: RetrievalGateway<R>) -> Self {
        Self { retrieval }
    }

    /// Locate the document most relevant to `description`
    pub async fn locate(&self, description: &str) -> Result<DocumentMatch, ExtractorError> {
        if !self.retrieval.is_ready() {
            return Err(ExtractorError::RetrievalUnavailable);
        }

        let best = self
            .retrieval
            .search(description, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(ExtractorError::DocumentNotFound)?;

        let filename = best.filename().unwrap_or_else(|| UNSPECIFIED.to_string());
        info!("Located '{}' ({})", filename, best.source);

        Ok(DocumentMatch {
            source_id: best.source,
            filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandi_domain::Fragment;
    use bandi_store::InMemoryFragmentIndex;

    fn locator(fragments: Vec<Fragment>) -> DocumentLocator<InMemoryFragmentIndex> {
        DocumentLocator::new(
            Arc::new(InMemoryFragmentIndex::from_fragments(fragments)),
            &ExtractorConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_locate_best_match() {
        let locator = locator(vec![
            Fragment::new("Bando per aziende agricole", "db/agri.pdf", 1),
            Fragment::new("Contributi per la digitalizzazione delle PMI", "db/digit.pdf", 1)
                .with_metadata("filename", "Bando Digitale.pdf"),
        ]);

        let found = locator
            .locate("Siamo una PMI che vuole investire nella digitalizzazione")
            .await
            .unwrap();
        assert_eq!(found.source_id, "db/digit.pdf");
        assert_eq!(found.filename, "Bando Digitale.pdf");
    }

    #[tokio::test]
    async fn test_filename_falls_back_to_basename() {
        let locator = locator(vec![Fragment::new("agricoltura", "db/agri.pdf", 1)]);
        let found = locator.locate("agricoltura").await.unwrap();
        assert_eq!(found.filename, "agri.pdf");
    }

    #[tokio::test]
    async fn test_empty_index_is_unavailable() {
        let result = locator(Vec::new()).locate("qualsiasi").await;
        assert!(matches!(result, Err(ExtractorError::RetrievalUnavailable)));
    }
}
