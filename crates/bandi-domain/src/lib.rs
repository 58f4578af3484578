//! Bandi Domain Layer
//!
//! Core vocabulary shared by every crate in the workspace: the indexed
//! [`Fragment`] a retrieval backend hands back, the eleven-key
//! [`ExtractionRecord`] the pipeline produces, and the trait boundaries
//! ([`traits::FragmentRetriever`], [`traits::LlmProvider`]) that the
//! infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **Fragment**: a retrievable unit of document text with page/source metadata
//! - **Record**: the structured description of one grant notice
//! - **Sentinel**: `"Non specificato"`, the terminal value of an unresolved field
//!
//! ## Architecture
//!
//! Only `serde` is pulled in; no I/O and no async runtime live here.
//! Implementations of the traits live in `bandi-store` and `bandi-llm`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fragment;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use fragment::Fragment;
pub use record::{ExtractionRecord, Field, FieldValue, Unresolved, UNSPECIFIED};
