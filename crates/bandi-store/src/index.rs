//! In-memory fragment index

use crate::StoreError;
use bandi_domain::traits::FragmentRetriever;
use bandi_domain::Fragment;
use std::collections::HashSet;
use std::convert::Infallible;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Terms shorter than this are ignored when ranking
const MIN_TERM_LEN: usize = 3;

/// A `FragmentRetriever` over fragments held in memory
///
/// # Examples
///
/// ```
/// use bandi_domain::Fragment;
/// use bandi_domain::traits::FragmentRetriever;
/// use bandi_store::InMemoryFragmentIndex;
///
/// let index = InMemoryFragmentIndex::from_fragments(vec![
///     Fragment::new("Dotazione finanziaria: € 5.000.000", "a.pdf", 1),
///     Fragment::new("Beneficiari: PMI lombarde", "a.pdf", 2),
/// ]);
///
/// let hits = index.similarity_search("dotazione finanziaria", 1).unwrap();
/// assert_eq!(hits[0].page, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryFragmentIndex {
    fragments: Vec<Fragment>,
    terms: Vec<HashSet<String>>,
}

impl InMemoryFragmentIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from fragments, keeping their order
    pub fn from_fragments(fragments: impl IntoIterator<Item = Fragment>) -> Self {
        let mut index = Self::new();
        index.extend(fragments);
        index
    }

    /// Load a JSON array of fragments
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: shown.clone(),
            source,
        })?;
        let fragments: Vec<Fragment> =
            serde_json::from_str(&contents).map_err(|source| StoreError::Json {
                path: shown.clone(),
                source,
            })?;

        info!("Loaded {} fragments from {}", fragments.len(), shown);
        Ok(Self::from_fragments(fragments))
    }

    /// Add one fragment
    pub fn add(&mut self, fragment: Fragment) {
        self.terms.push(tokenize(&fragment.content));
        self.fragments.push(fragment);
    }

    /// Add many fragments
    pub fn extend(&mut self, fragments: impl IntoIterator<Item = Fragment>) {
        for fragment in fragments {
            self.add(fragment);
        }
    }

    /// Number of indexed fragments
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the index holds no fragments
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Distinct sources in first-seen order
    pub fn sources(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.fragments
            .iter()
            .map(|fragment| fragment.source.as_str())
            .filter(|source| seen.insert(*source))
            .collect()
    }
}

impl FragmentRetriever for InMemoryFragmentIndex {
    type Error = Infallible;

    fn is_ready(&self) -> bool {
        !self.is_empty()
    }

    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Fragment>, Self::Error> {
        let query_terms = tokenize(query);

        let mut scored: Vec<(usize, &Fragment)> = self
            .fragments
            .iter()
            .zip(self.terms.iter())
            .map(|(fragment, terms)| (query_terms.intersection(terms).count(), fragment))
            .collect();

        // Stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        debug!(
            "Ranked {} fragments for query with {} terms",
            scored.len(),
            query_terms.len()
        );

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, fragment)| fragment.clone())
            .collect())
    }

    fn fragments_for_source(&self, source_id: &str) -> Result<Option<Vec<Fragment>>, Self::Error> {
        Ok(Some(
            self.fragments
                .iter()
                .filter(|fragment| fragment.belongs_to(source_id))
                .cloned()
                .collect(),
        ))
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| term.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}
