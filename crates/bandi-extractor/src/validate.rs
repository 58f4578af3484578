//! Final consistency pass over the whole record
//!
//! The pass only ever upgrades unspecified fields. A resolved value is never
//! replaced, and any failure leaves the record as it was.

use crate::config::{CrossCheckPolicy, ExtractorConfig};
use crate::error::ExtractorError;
use crate::gateway::LlmGateway;
use crate::parser::{parse_cross_check, parse_date_lines};
use crate::prompt::{cross_check_prompt, date_search_prompt};
use crate::types::ReconstructedDocument;
use bandi_domain::traits::LlmProvider;
use bandi_domain::{ExtractionRecord, Field, FieldValue};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the consistency pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Dates filled by the targeted re-search
    pub dates_recovered: usize,
    /// Fields filled by the whole-record cross-check
    pub fields_corrected: usize,
    /// Whether the cross-check ran
    pub cross_check_ran: bool,
}

impl ValidationReport {
    /// Fields upgraded by either step
    pub fn total_corrections(&self) -> usize {
        self.dates_recovered + self.fields_corrected
    }
}

/// Reconciles a record against its full document
pub struct ConsistencyValidator<L> {
    llm: LlmGateway<L>,
    policy: CrossCheckPolicy,
    date_search_excerpt_chars: usize,
    validation_excerpt_chars: usize,
}

impl<L> ConsistencyValidator<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a validator
    pub fn new(llm: Arc<L>, config: &ExtractorConfig) -> Self {
        Self::from_gateway(LlmGateway::new(llm, config.call_timeout()), config)
    }

    pub(crate) fn from_gateway(llm: LlmGateway<L>, config: &ExtractorConfig) -> Self {
        Self {
            llm,
            policy: config.cross_check,
            date_search_excerpt_chars: config.date_search_excerpt_chars,
            validation_excerpt_chars: config.validation_excerpt_chars,
        }
    }

    /// Run the date re-search and the cross-check
    pub async fn validate(
        &self,
        record: &mut ExtractionRecord,
        document: &ReconstructedDocument,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        if record.is_unspecified(Field::OpeningDate) || record.is_unspecified(Field::ClosingDate) {
            match self.recover_dates(record, document).await {
                Ok(recovered) => report.dates_recovered = recovered,
                Err(e) => warn!("Date re-search skipped: {}", e),
            }
        }

        if self.should_cross_check(record) {
            report.cross_check_ran = true;
            match self.cross_check(record, document).await {
                Ok(corrected) => report.fields_corrected = corrected,
                Err(e) => warn!("Cross-check failed, keeping extracted values: {}", e),
            }
        } else {
            debug!("Cross-check skipped by policy {:?}", self.policy);
        }

        info!(
            "Consistency pass: {} dates recovered, {} fields corrected",
            report.dates_recovered, report.fields_corrected
        );
        report
    }

    fn should_cross_check(&self, record: &ExtractionRecord) -> bool {
        match self.policy {
            CrossCheckPolicy::Always => true,
            CrossCheckPolicy::WhenUnresolved => !record.is_complete(),
            CrossCheckPolicy::Never => false,
        }
    }

    async fn recover_dates(
        &self,
        record: &mut ExtractionRecord,
        document: &ReconstructedDocument,
    ) -> Result<usize, ExtractorError> {
        let prompt = date_search_prompt(document.excerpt(self.date_search_excerpt_chars));
        let response = self.llm.generate(prompt).await?;
        let lines = parse_date_lines(&response)?;

        let mut recovered = 0;
        for (field, value) in [
            (Field::OpeningDate, lines.opening),
            (Field::ClosingDate, lines.closing),
        ] {
            if let Some(value) = value {
                if record.fill_if_unspecified(field, FieldValue::from_answer(value.as_str())) {
                    info!("Recovered {}: {}", field, value);
                    recovered += 1;
                }
            }
        }
        Ok(recovered)
    }

    async fn cross_check(
        &self,
        record: &mut ExtractionRecord,
        document: &ReconstructedDocument,
    ) -> Result<usize, ExtractorError> {
        let record_json = serde_json::to_string_pretty(&*record)?;
        let prompt = cross_check_prompt(&record_json, document.excerpt(self.validation_excerpt_chars));
        let response = self.llm.generate(prompt).await?;

        let mut corrected = 0;
        for (field, value) in parse_cross_check(&response)? {
            if record.fill_if_unspecified(field, FieldValue::from_answer(value.as_str())) {
                info!("Corrected {}: {}", field, value.chars().take(50).collect::<String>());
                corrected += 1;
            }
        }
        Ok(corrected)
    }
}
