//! Retrieval-scoped extraction of single fields

use crate::config::ExtractorConfig;
use crate::dates::{parse_canonical, DateNormalizer};
use crate::error::ExtractorError;
use crate::fields::{FieldKind, FieldSpec};
use crate::gateway::{LlmGateway, RetrievalGateway};
use crate::prompt::PromptBuilder;
use bandi_domain::traits::{FragmentRetriever, LlmProvider};
use bandi_domain::{FieldValue, Fragment, UNSPECIFIED};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves one field with its own retrieval query and prompt
pub struct FieldExtractor<L, R> {
    llm: LlmGateway<L>,
    retrieval: RetrievalGateway<R>,
    field_search_k: usize,
    normalize_dates: bool,
    normalizer: DateNormalizer,
}

impl<L, R> FieldExtractor<L, R>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    R: FragmentRetriever + Send + Sync + 'static,
    R::Error: Display,
{
    /// Create a field extractor
    pub fn new(llm: Arc<L>, retriever: Arc<R>, config: &ExtractorConfig) -> Self {
        Self::from_gateways(
            LlmGateway::new(llm, config.call_timeout()),
            RetrievalGateway::new(retriever, config.call_timeout()),
            config,
        )
    }

    pub(crate) fn from_gateways(
        llm: LlmGateway<L>,
        retrieval: RetrievalGateway<R>,
        config: &ExtractorConfig,
    ) -> Self {
        Self {
            llm,
            retrieval,
            field_search_k: config.field_search_k,
            normalize_dates: config.normalize_dates,
            normalizer: DateNormalizer::new(),
        }
    }

    /// Resolve `spec` for the document `source_id`
    ///
    /// Never fails: a retrieval or model error yields
    /// `Unspecified(Failed)`.
    pub async fn extract(&self, spec: &FieldSpec, source_id: &str) -> FieldValue {
        match self.try_extract(spec, source_id).await {
            Ok(value) => {
                debug!("{} -> {:?}", spec.field, value);
                value
            }
            Err(e) => {
                warn!("Extraction of '{}' failed: {}", spec.field, e);
                FieldValue::failed(e.to_string())
            }
        }
    }

    async fn try_extract(&self, spec: &FieldSpec, source_id: &str) -> Result<FieldValue, ExtractorError> {
        let hits = self
            .retrieval
            .search(spec.retrieval_query, self.field_search_k)
            .await?;
        let context = scoped_context(hits, source_id);

        let prompt = PromptBuilder::new(spec, context.as_str()).build();
        let answer = self.llm.generate(prompt).await?;

        Ok(self.interpret(spec, &answer, &context))
    }

    /// Turn a raw model answer into a field value
    ///
    /// Date answers that are not already `DD/MM/YYYY` go through the
    /// [`DateNormalizer`] first, with `context` supplying a missing year.
    /// The raw answer is kept when normalization finds no single date.
    pub fn interpret(&self, spec: &FieldSpec, answer: &str, context: &str) -> FieldValue {
        let answer = answer.trim();
        if answer.is_empty() || answer == UNSPECIFIED {
            return FieldValue::from_answer(answer);
        }

        let candidate = match spec.kind {
            FieldKind::Date if self.normalize_dates && parse_canonical(answer).is_none() => self
                .normalizer
                .normalize(answer, context)
                .unwrap_or_else(|| answer.to_string()),
            _ => answer.to_string(),
        };

        if spec.accepts(&candidate) {
            FieldValue::from_answer(candidate)
        } else {
            debug!("Validator rejected '{}' for {}", answer, spec.field);
            FieldValue::rejected(answer)
        }
    }
}

/// Join retrieved fragments into prompt context
///
/// Fragments of other sources are dropped as long as at least one
/// fragment belongs to `source_id`; otherwise everything retrieved is kept.
pub fn scoped_context(hits: Vec<Fragment>, source_id: &str) -> String {
    let any_own = hits.iter().any(|fragment| fragment.belongs_to(source_id));
    hits.into_iter()
        .filter(|fragment| !any_own || fragment.belongs_to(source_id))
        .map(|fragment| fragment.content)
        .collect::<Vec<_>>()
        .join("\n\n")
}
