//! Bandi Extractor
//!
//! Reconstructs grant notices from indexed fragments and extracts their
//! structured description with a language model.
//!
//! # Overview
//!
//! A notice is stored as many fragments in a retrieval index. The pipeline
//! reassembles the full text once, then resolves each field with its own
//! retrieval query and a prompt specialized for the field kind. Secondary
//! fields are derived from the result, and a final consistency pass fills
//! whatever is still missing. Resolved values are never overwritten.
//!
//! # Architecture
//!
//! ```text
//! source_id → DocumentReconstructor → FieldExtractor (per field)
//!           → DerivedFieldGenerator → ConsistencyValidator → ExtractionRecord
//! ```
//!
//! # Key Features
//!
//! - **Page-ordered reconstruction**: fragments are stable-sorted by page with page markers
//! - **Field-scoped retrieval**: every field has its own query and validator
//! - **Date normalization**: Italian date expressions become `DD/MM/YYYY`
//! - **Monotonic validation**: the consistency pass only fills unspecified fields
//! - **Background runs**: [`ExtractionPipeline::spawn`] returns a pollable task handle
//!
//! # Example Usage
//!
//! ```no_run
//! use bandi_domain::Fragment;
//! use bandi_extractor::{ExtractionPipeline, ExtractionRequest, ExtractorConfig};
//! use bandi_llm::MockProvider;
//! use bandi_store::InMemoryFragmentIndex;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let index = InMemoryFragmentIndex::from_fragments(vec![
//!     Fragment::new("Regione Lombardia - Bando Digitale 2025", "bando.pdf", 1),
//! ]);
//! let llm = MockProvider::new("Regione Lombardia");
//!
//! let pipeline = ExtractionPipeline::new(llm, index, ExtractorConfig::default())?;
//! let outcome = pipeline
//!     .run(ExtractionRequest::new("bando.pdf", "bando.pdf"))
//!     .await?;
//!
//! println!("{}", serde_json::to_string_pretty(&outcome.record)?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod dates;
mod derive;
mod error;
mod extractor;
mod fields;
mod gateway;
mod locate;
mod parser;
mod pipeline;
mod prompt;
mod reconstruct;
mod task;
mod types;
mod validate;

#[cfg(test)]
mod tests;

pub use config::{CrossCheckPolicy, ExtractorConfig};
pub use dates::{format_canonical, parse_canonical, DateNormalizer, CANONICAL_FORMAT, ITALIAN_MONTHS};
pub use derive::{
    open_status, Clock, DerivedFieldGenerator, FixedClock, SystemClock, DESCRIPTION_FALLBACK,
    KEYWORDS_FALLBACK,
};
pub use error::ExtractorError;
pub use extractor::FieldExtractor;
pub use fields::{is_valid_date_answer, FieldKind, FieldSpec, STANDARD_FIELDS};
pub use locate::DocumentLocator;
pub use pipeline::ExtractionPipeline;
pub use reconstruct::{assemble, page_marker, DocumentReconstructor};
pub use task::{ExtractionResult, ExtractionTask, WaitOutcome};
pub use types::{
    DocumentMatch, ExtractionMetadata, ExtractionOutcome, ExtractionRequest, ReconstructedDocument,
};
pub use validate::{ConsistencyValidator, ValidationReport};
