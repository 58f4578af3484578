//! Bandi Store
//!
//! Storage-side adapters for the extraction pipeline:
//!
//! - [`InMemoryFragmentIndex`]: a `FragmentRetriever` over fragments loaded
//!   from a JSON corpus. Ranking is a plain term-overlap count; it exists so
//!   the pipeline can run without an external vector index.
//! - [`RecordStore`]: one pretty-printed JSON file per extracted notice.

#![warn(missing_docs)]

pub mod index;
pub mod records;

use thiserror::Error;

pub use index::InMemoryFragmentIndex;
pub use records::RecordStore;

/// Errors that can occur in the store layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error
    #[error("JSON error in {path}: {source}")]
    Json {
        /// Path being accessed
        path: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Record has no usable filename
    #[error("Invalid record filename: {0:?}")]
    InvalidFilename(String),
}
