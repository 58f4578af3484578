//! Indexed document fragments

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Metadata key holding the display filename of the source document
pub const FILENAME_KEY: &str = "filename";

/// A retrievable unit of document text
///
/// Fragments are produced by the retrieval backend and are never mutated by
/// the pipeline. `source` identifies the document the fragment was cut from
/// (usually the path of the original PDF) and `page` its position in it.
///
/// # Examples
///
/// ```
/// use bandi_domain::Fragment;
///
/// let fragment = Fragment::new("Dotazione: € 2.000.000", "docs/bando.pdf", 3)
///     .with_metadata("filename", "bando.pdf");
///
/// assert_eq!(fragment.page, 3);
/// assert_eq!(fragment.filename().as_deref(), Some("bando.pdf"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Text content of the fragment
    pub content: String,

    /// Identifier of the source document
    pub source: String,

    /// Page (or position) marker within the source
    #[serde(default)]
    pub page: u32,

    /// Additional backend-specific metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Fragment {
    /// Create a fragment without metadata
    pub fn new(content: impl Into<String>, source: impl Into<String>, page: u32) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            page,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether this fragment was cut from `source_id`
    pub fn belongs_to(&self, source_id: &str) -> bool {
        self.source == source_id
    }

    /// Display filename of the source document
    ///
    /// Prefers an explicit `filename` metadata entry and falls back to the
    /// last path component of `source`.
    pub fn filename(&self) -> Option<String> {
        if let Some(name) = self.metadata.get(FILENAME_KEY) {
            if !name.trim().is_empty() {
                return Some(name.clone());
            }
        }

        Path::new(&self.source)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}
