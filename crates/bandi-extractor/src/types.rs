//! Request and response types for extraction

use bandi_domain::ExtractionRecord;
use uuid::Uuid;

/// Request to extract the record of one source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Identifier of the source whose fragments make up the document
    pub source_id: String,

    /// Display filename, copied verbatim into the record
    pub filename: String,
}

impl ExtractionRequest {
    /// Create a request
    pub fn new(source_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            filename: filename.into(),
        }
    }
}

impl From<DocumentMatch> for ExtractionRequest {
    fn from(found: DocumentMatch) -> Self {
        Self::new(found.source_id, found.filename)
    }
}

/// The document most relevant to a business description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMatch {
    /// Source identifier of the best-ranked fragment
    pub source_id: String,

    /// Display filename of that source
    pub filename: String,
}

/// One document reassembled from its fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedDocument {
    /// Source the fragments were filtered on
    pub source_id: String,

    /// Linearized text with page markers
    pub text: String,

    /// Fragments that went into the text
    pub fragment_count: usize,

    /// Distinct pages seen
    pub page_count: usize,
}

impl ReconstructedDocument {
    /// Whether no fragment matched the source
    pub fn is_empty(&self) -> bool {
        self.fragment_count == 0
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The first `max_chars` characters of the text
    pub fn excerpt(&self, max_chars: usize) -> &str {
        excerpt(&self.text, max_chars)
    }
}

/// The first `max_chars` characters of `text`, cut on a char boundary
pub(crate) fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Result of a completed extraction run
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// The final record
    pub record: ExtractionRecord,

    /// Metadata about the run
    pub metadata: ExtractionMetadata,
}

/// Metadata about an extraction run
#[derive(Debug, Clone)]
pub struct ExtractionMetadata {
    /// Identifier of the run
    pub run_id: Uuid,

    /// Source identifier
    pub source_id: String,

    /// Name of the LLM model used
    pub model_name: String,

    /// Fragments in the reconstructed document
    pub fragment_count: usize,

    /// Distinct pages in the reconstructed document
    pub page_count: usize,

    /// Reconstructed document length in characters
    pub document_chars: usize,

    /// Fields resolved in the final record
    pub fields_resolved: usize,

    /// Fields upgraded by the consistency pass
    pub fields_corrected: usize,

    /// Timestamp when the run finished (seconds since the Unix epoch)
    pub timestamp: u64,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
