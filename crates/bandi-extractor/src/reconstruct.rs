//! Reassemble one document from its indexed fragments

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::gateway::RetrievalGateway;
use crate::types::ReconstructedDocument;
use bandi_domain::traits::FragmentRetriever;
use bandi_domain::Fragment;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Separator inserted before each run of fragments from the same page
pub fn page_marker(page: u32) -> String {
    format!("\n\n--- PAGINA {} ---\n\n", page)
}

/// Linearize the fragments of `source_id`
///
/// Fragments of other sources are dropped. The rest are stable-sorted by
/// page, so fragments of the same page keep their retrieval order, and a
/// page marker is emitted whenever the page changes. Content is never
/// altered or deduplicated.
pub fn assemble(source_id: &str, fragments: Vec<Fragment>) -> ReconstructedDocument {
    let mut own: Vec<Fragment> = fragments
        .into_iter()
        .filter(|fragment| fragment.belongs_to(source_id))
        .collect();
    own.sort_by_key(|fragment| fragment.page);

    let mut text = String::new();
    let mut pages = BTreeSet::new();
    let mut current_page = None;

    for fragment in &own {
        if current_page != Some(fragment.page) {
            text.push_str(&page_marker(fragment.page));
            current_page = Some(fragment.page);
            pages.insert(fragment.page);
        }
        text.push_str(&fragment.content);
        text.push('\n');
    }

    ReconstructedDocument {
        source_id: source_id.to_string(),
        text,
        fragment_count: own.len(),
        page_count: pages.len(),
    }
}

/// Rebuilds full documents through a [`FragmentRetriever`]
pub struct DocumentReconstructor<R> {
    retrieval: RetrievalGateway<R>,
    reconstruction_k: usize,
}

impl<R> DocumentReconstructor<R>
where
    R: FragmentRetriever + Send + Sync + 'static,
    R::Error: Display,
{
    /// Create a reconstructor
    pub fn new(retriever: Arc<R>, config: &ExtractorConfig) -> Self {
        Self::from_gateway(
            RetrievalGateway::new(retriever, config.call_timeout()),
            config,
        )
    }

    pub(crate) fn from_gateway(retrieval: RetrievalGateway<R>, config: &ExtractorConfig) -> Self {
        Self {
            retrieval,
            reconstruction_k: config.reconstruction_k,
        }
    }

    /// Rebuild the document of `source_id`
    ///
    /// Lists the source's fragments when the backend supports it, otherwise
    /// filters a broad empty-query search. A retrieval failure counts as no
    /// fragments.
    pub async fn reconstruct(&self, source_id: &str) -> Result<ReconstructedDocument, ExtractorError> {
        let fragments = match self.fetch(source_id).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!("Fragment retrieval for '{}' failed: {}", source_id, e);
                Vec::new()
            }
        };
        debug!("Retrieved {} candidate fragments", fragments.len());

        let document = assemble(source_id, fragments);
        if document.is_empty() {
            return Err(ExtractorError::ReconstructionEmpty(source_id.to_string()));
        }

        info!(
            "Reconstructed '{}': {} fragments, {} pages, {} chars",
            source_id,
            document.fragment_count,
            document.page_count,
            document.char_len()
        );
        Ok(document)
    }

    async fn fetch(&self, source_id: &str) -> Result<Vec<Fragment>, ExtractorError> {
        if let Some(fragments) = self.retrieval.fragments_for_source(source_id).await? {
            return Ok(fragments);
        }
        debug!(
            "Backend cannot list by source, falling back to broad search (k={})",
            self.reconstruction_k
        );
        self.retrieval.search("", self.reconstruction_k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::convert::Infallible;

    #[test]
    fn test_pages_are_ordered_with_markers() {
        let document = assemble(
            "X",
            vec![Fragment::new("beta", "X", 2), Fragment::new("alfa", "X", 1)],
        );

        assert_eq!(
            document.text,
            format!("{}alfa\n{}beta\n", page_marker(1), page_marker(2))
        );
        assert_eq!(document.fragment_count, 2);
        assert_eq!(document.page_count, 2);

        let a = document.text.find("alfa").unwrap();
        let marker = document.text.find("--- PAGINA 2 ---").unwrap();
        let b = document.text.find("beta").unwrap();
        assert!(a < marker && marker < b);
    }

    #[test]
    fn test_same_page_keeps_retrieval_order() {
        let document = assemble(
            "X",
            vec![
                Fragment::new("secondo", "X", 3),
                Fragment::new("primo", "X", 1),
                Fragment::new("terzo", "X", 3),
            ],
        );
        assert_eq!(
            document.text,
            format!("{}primo\n{}secondo\nterzo\n", page_marker(1), page_marker(3))
        );
    }

    #[test]
    fn test_foreign_fragments_are_dropped() {
        let document = assemble(
            "X",
            vec![Fragment::new("mio", "X", 1), Fragment::new("altrui", "Y", 1)],
        );
        assert!(!document.text.contains("altrui"));
        assert_eq!(document.fragment_count, 1);
    }

    #[test]
    fn test_no_matching_fragments_is_empty() {
        let document = assemble("X", vec![Fragment::new("altrui", "Y", 1)]);
        assert!(document.is_empty());
        assert!(document.text.is_empty());
    }

    /// Backend without per-source listing
    struct SearchOnly(Vec<Fragment>);

    impl FragmentRetriever for SearchOnly {
        type Error = Infallible;

        fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<Fragment>, Self::Error> {
            Ok(self.0.iter().take(k).cloned().collect())
        }
    }

    struct Broken;

    impl FragmentRetriever for Broken {
        type Error = String;

        fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<Fragment>, Self::Error> {
            Err("index corrupted".to_string())
        }
    }

    #[tokio::test]
    async fn test_reconstruct_falls_back_to_broad_search() {
        let retriever = SearchOnly(vec![
            Fragment::new("beta", "X", 2),
            Fragment::new("altro", "Y", 1),
            Fragment::new("alfa", "X", 1),
        ]);
        let reconstructor =
            DocumentReconstructor::new(Arc::new(retriever), &ExtractorConfig::default());

        let document = reconstructor.reconstruct("X").await.unwrap();
        assert_eq!(document.fragment_count, 2);
        assert!(document.text.find("alfa").unwrap() < document.text.find("beta").unwrap());
    }

    #[tokio::test]
    async fn test_reconstruct_respects_broad_search_limit() {
        let retriever = SearchOnly(vec![
            Fragment::new("altro", "Y", 1),
            Fragment::new("alfa", "X", 1),
        ]);
        let config = ExtractorConfig {
            reconstruction_k: 1,
            ..Default::default()
        };
        let reconstructor = DocumentReconstructor::new(Arc::new(retriever), &config);

        let result = reconstructor.reconstruct("X").await;
        assert!(matches!(result, Err(ExtractorError::ReconstructionEmpty(source)) if source == "X"));
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_empty_reconstruction() {
        let reconstructor = DocumentReconstructor::new(Arc::new(Broken), &ExtractorConfig::default());
        let result = reconstructor.reconstruct("X").await;
        assert!(matches!(result, Err(ExtractorError::ReconstructionEmpty(_))));
    }

    fn fragment_strategy() -> impl Strategy<Value = Fragment> {
        (
            "[a-z]{1,8}",
            prop_oneof![Just("X".to_string()), Just("Y".to_string())],
            0u32..6,
        )
            .prop_map(|(content, source, page)| Fragment::new(content, source, page))
    }

    proptest! {
        /// Property: pages appear in ascending order, same-page fragments in input order
        #[test]
        fn test_assembly_order(fragments in prop::collection::vec(fragment_strategy(), 0..20)) {
            let document = assemble("X", fragments.clone());

            let mut expected: Vec<&Fragment> = fragments.iter().filter(|f| f.source == "X").collect();
            expected.sort_by_key(|f| f.page);

            let mut rebuilt = String::new();
            let mut page = None;
            for fragment in &expected {
                if page != Some(fragment.page) {
                    rebuilt.push_str(&page_marker(fragment.page));
                    page = Some(fragment.page);
                }
                rebuilt.push_str(&fragment.content);
                rebuilt.push('\n');
            }

            prop_assert_eq!(document.text, rebuilt);
            prop_assert_eq!(document.fragment_count, expected.len());
        }

        /// Property: every kept fragment belongs to the requested source
        #[test]
        fn test_assembly_filters_by_source(fragments in prop::collection::vec(fragment_strategy(), 0..20)) {
            let document = assemble("X", fragments.clone());
            let own = fragments.iter().filter(|f| f.belongs_to("X")).count();
            let markers = document.text.matches("--- PAGINA").count();

            prop_assert_eq!(document.fragment_count, own);
            prop_assert_eq!(markers, document.page_count);
            prop_assert!(document.page_count <= own);
        }
    }
}
