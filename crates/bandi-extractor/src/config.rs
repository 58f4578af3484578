//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When the whole-record cross-check of the consistency pass runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CrossCheckPolicy {
    /// Every run, even when all fields are already resolved
    #[default]
    Always,
    /// Only when at least one field is still unspecified
    WhenUnresolved,
    /// Never
    Never,
}

/// Configuration for the extraction pipeline
///
/// Excerpt sizes are counted in characters, not bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Fragments retrieved per field query
    pub field_search_k: usize,

    /// Fragments requested by the broad query used to rebuild a document
    /// when the backend cannot list fragments by source
    pub reconstruction_k: usize,

    /// Documents at or below this length get no synthesized description
    pub min_description_chars: usize,

    /// Leading excerpt given to the description prompt
    pub description_excerpt_chars: usize,

    /// Leading excerpt given to the keyword prompt
    pub keyword_excerpt_chars: usize,

    /// Leading excerpt given to the missing-date re-search
    pub date_search_excerpt_chars: usize,

    /// Leading excerpt given to the whole-record cross-check
    pub validation_excerpt_chars: usize,

    /// Maximum time for a single retrieval or LLM call (seconds)
    pub call_timeout_secs: u64,

    /// Run non-canonical date answers through the deterministic normalizer
    pub normalize_dates: bool,

    /// When the whole-record cross-check runs
    pub cross_check: CrossCheckPolicy,
}

impl ExtractorConfig {
    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.field_search_k == 0 {
            return Err("field_search_k must be greater than 0".to_string());
        }
        if self.reconstruction_k == 0 {
            return Err("reconstruction_k must be greater than 0".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        let excerpts = [
            ("description_excerpt_chars", self.description_excerpt_chars),
            ("keyword_excerpt_chars", self.keyword_excerpt_chars),
            ("date_search_excerpt_chars", self.date_search_excerpt_chars),
            ("validation_excerpt_chars", self.validation_excerpt_chars),
        ];
        for (name, value) in excerpts {
            if value == 0 {
                return Err(format!("{} must be greater than 0", name));
            }
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            field_search_k: 3,
            reconstruction_k: 200,
            min_description_chars: 500,
            description_excerpt_chars: 2_000,
            keyword_excerpt_chars: 1_000,
            date_search_excerpt_chars: 5_000,
            validation_excerpt_chars: 3_000,
            call_timeout_secs: 120,
            normalize_dates: true,
            cross_check: CrossCheckPolicy::Always,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: shorter timeouts, smaller excerpts, cross-check only when needed
    pub fn aggressive() -> Self {
        Self {
            description_excerpt_chars: 1_000,
            keyword_excerpt_chars: 500,
            date_search_excerpt_chars: 2_500,
            validation_excerpt_chars: 1_500,
            call_timeout_secs: 60,
            cross_check: CrossCheckPolicy::WhenUnresolved,
            ..Self::default()
        }
    }

    /// Lenient preset: longer timeouts, wider context for better quality
    pub fn lenient() -> Self {
        Self {
            field_search_k: 5,
            reconstruction_k: 500,
            description_excerpt_chars: 4_000,
            keyword_excerpt_chars: 2_000,
            date_search_excerpt_chars: 10_000,
            validation_excerpt_chars: 6_000,
            call_timeout_secs: 300,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
