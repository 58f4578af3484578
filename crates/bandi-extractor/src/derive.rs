//! Secondary fields computed from the extracted record

use crate::config::ExtractorConfig;
use crate::dates::parse_canonical;
use crate::gateway::LlmGateway;
use crate::prompt::{description_prompt, keywords_prompt};
use crate::types::ReconstructedDocument;
use bandi_domain::traits::LlmProvider;
use bandi_domain::{ExtractionRecord, Field, FieldValue, Unresolved};
use chrono::{Local, NaiveDate};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Description used when the summary call fails
pub const DESCRIPTION_FALLBACK: &str = "Bando per il finanziamento di progetti innovativi";

/// Keywords used when the keyword call fails
pub const KEYWORDS_FALLBACK: &str = "innovazione, digitalizzazione, PMI, Lombardia";

/// Source of the current date
pub trait Clock: Send + Sync {
    /// Today's date
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Open status for a closing date
///
/// `"si"` while `today` is on or before the closing date, `"no"` after it.
/// An unspecified or unparseable closing date gives no status.
pub fn open_status(closing: &FieldValue, today: NaiveDate) -> FieldValue {
    match closing {
        FieldValue::Resolved(value) => match parse_canonical(value) {
            Some(closing) if today <= closing => FieldValue::Resolved("si".to_string()),
            Some(_) => FieldValue::Resolved("no".to_string()),
            None => FieldValue::rejected(value.clone()),
        },
        FieldValue::Unspecified(_) => FieldValue::Unspecified(Unresolved::NotFound),
    }
}

/// Fills description, keywords, open status and source filename
pub struct DerivedFieldGenerator<L> {
    llm: LlmGateway<L>,
    clock: Arc<dyn Clock>,
    min_description_chars: usize,
    description_excerpt_chars: usize,
    keyword_excerpt_chars: usize,
}

impl<L> DerivedFieldGenerator<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a generator
    pub fn new(llm: Arc<L>, clock: Arc<dyn Clock>, config: &ExtractorConfig) -> Self {
        Self::from_gateway(LlmGateway::new(llm, config.call_timeout()), clock, config)
    }

    pub(crate) fn from_gateway(
        llm: LlmGateway<L>,
        clock: Arc<dyn Clock>,
        config: &ExtractorConfig,
    ) -> Self {
        Self {
            llm,
            clock,
            min_description_chars: config.min_description_chars,
            description_excerpt_chars: config.description_excerpt_chars,
            keyword_excerpt_chars: config.keyword_excerpt_chars,
        }
    }

    /// Fill every derived field of `record`
    pub async fn derive(
        &self,
        record: &mut ExtractionRecord,
        document: &ReconstructedDocument,
        filename: &str,
    ) {
        let description = self.description(record, document).await;
        record.set(Field::AdditionalDescription, description);

        let keywords = self.keywords(record, document).await;
        record.set(Field::Keywords, keywords);

        let status = self.status(record);
        match &status {
            FieldValue::Resolved(open) => info!(
                "Notice open: {} (closing {})",
                open,
                record.value_str(Field::ClosingDate)
            ),
            FieldValue::Unspecified(_) => warn!("Open status undetermined: no usable closing date"),
        }
        record.set(Field::OpenStatus, status);

        record.set(Field::SourceFilename, FieldValue::from_answer(filename));
    }

    /// Open status from the record's closing date and the clock
    pub fn status(&self, record: &ExtractionRecord) -> FieldValue {
        open_status(record.get(Field::ClosingDate), self.clock.today())
    }

    async fn description(&self, record: &ExtractionRecord, document: &ReconstructedDocument) -> FieldValue {
        if document.char_len() <= self.min_description_chars {
            debug!(
                "Document too short for a description ({} chars)",
                document.char_len()
            );
            return FieldValue::Unspecified(Unresolved::NotFound);
        }

        let prompt = description_prompt(
            document.excerpt(self.description_excerpt_chars),
            record.value_str(Field::IssuingBody),
            record.value_str(Field::NoticeTitle),
            record.value_str(Field::Beneficiaries),
        );
        match self.llm.generate(prompt).await {
            Ok(answer) => FieldValue::from_answer(answer),
            Err(e) => {
                warn!("Description synthesis failed, using fallback: {}", e);
                FieldValue::from_answer(DESCRIPTION_FALLBACK)
            }
        }
    }

    async fn keywords(&self, record: &ExtractionRecord, document: &ReconstructedDocument) -> FieldValue {
        let prompt = keywords_prompt(
            record.value_str(Field::NoticeTitle),
            record.value_str(Field::Beneficiaries),
            document.excerpt(self.keyword_excerpt_chars),
        );
        match self.llm.generate(prompt).await {
            Ok(answer) => FieldValue::from_answer(answer),
            Err(e) => {
                warn!("Keyword extraction failed, using fallback: {}", e);
                FieldValue::from_answer(KEYWORDS_FALLBACK)
            }
        }
    }
}
