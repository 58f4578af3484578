//! The extraction pipeline: reconstruct, extract, derive, validate

use crate::config::ExtractorConfig;
use crate::derive::{Clock, DerivedFieldGenerator, SystemClock};
use crate::error::ExtractorError;
use crate::extractor::FieldExtractor;
use crate::fields::{FieldSpec, STANDARD_FIELDS};
use crate::gateway::{LlmGateway, RetrievalGateway};
use crate::locate::DocumentLocator;
use crate::reconstruct::DocumentReconstructor;
use crate::task::ExtractionTask;
use crate::types::{ExtractionMetadata, ExtractionOutcome, ExtractionRequest};
use crate::validate::ConsistencyValidator;
use bandi_domain::traits::{FragmentRetriever, LlmProvider};
use bandi_domain::{ExtractionRecord, Field};
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Turns one indexed grant notice into an [`ExtractionRecord`]
///
/// Fields are resolved one at a time in the order of the field specs.
/// Only an unready backend or an empty reconstruction abort a run; every
/// other failure ends up as an unspecified field.
pub struct ExtractionPipeline<L, R> {
    llm: Arc<L>,
    retriever: Arc<R>,
    config: ExtractorConfig,
    clock: Arc<dyn Clock>,
    fields: Vec<FieldSpec>,
}

impl<L, R> ExtractionPipeline<L, R>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    R: FragmentRetriever + Send + Sync + 'static,
    R::Error: Display,
{
    /// Create a pipeline
    pub fn new(llm: L, retriever: R, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::from_shared(Arc::new(llm), Arc::new(retriever), config)
    }

    /// Create a pipeline over collaborators shared with other owners
    pub fn from_shared(
        llm: Arc<L>,
        retriever: Arc<R>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            llm,
            retriever,
            config,
            clock: Arc::new(SystemClock),
            fields: STANDARD_FIELDS.to_vec(),
        })
    }

    /// Use another clock for the open status
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the retrieval-resolved field specs
    pub fn with_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = fields;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// A locator over the same backend
    pub fn locator(&self) -> DocumentLocator<R> {
        DocumentLocator::from_gateway(self.retrieval())
    }

    /// Run a full extraction
    pub async fn run(&self, request: ExtractionRequest) -> Result<ExtractionOutcome, ExtractorError> {
        self.run_with_id(Uuid::now_v7(), request).await
    }

    /// Start a full extraction in the background
    pub fn spawn(self: &Arc<Self>, request: ExtractionRequest) -> ExtractionTask {
        let run_id = Uuid::now_v7();
        let source_id = request.source_id.clone();
        let (sender, receiver) = oneshot::channel();

        let pipeline = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = pipeline.run_with_id(run_id, request).await;
            if sender.send(result).is_err() {
                debug!("Run {} finished after its handle was dropped", run_id);
            }
        });

        info!("Spawned extraction run {} for '{}'", run_id, source_id);
        ExtractionTask::new(run_id, source_id, receiver, handle)
    }

    async fn run_with_id(
        &self,
        run_id: Uuid,
        request: ExtractionRequest,
    ) -> Result<ExtractionOutcome, ExtractorError> {
        let start_time = Instant::now();
        let llm = LlmGateway::new(Arc::clone(&self.llm), self.config.call_timeout());
        let retrieval = self.retrieval();

        info!(
            "Starting extraction run {} for '{}' ({})",
            run_id, request.source_id, request.filename
        );

        if !retrieval.is_ready() {
            return Err(ExtractorError::RetrievalUnavailable);
        }

        // 1. Full document
        let document = DocumentReconstructor::from_gateway(retrieval.clone(), &self.config)
            .reconstruct(&request.source_id)
            .await?;

        // 2. Retrieval-scoped fields
        let mut record = ExtractionRecord::new();
        let extractor = FieldExtractor::from_gateways(llm.clone(), retrieval, &self.config);
        for (idx, spec) in self.fields.iter().enumerate() {
            debug!("Extracting field {}/{}: {}", idx + 1, self.fields.len(), spec.field);
            let value = extractor.extract(spec, &request.source_id).await;
            record.set(spec.field, value);
        }

        // 3. Derived fields
        let generator =
            DerivedFieldGenerator::from_gateway(llm.clone(), Arc::clone(&self.clock), &self.config);
        generator.derive(&mut record, &document, &request.filename).await;

        // 4. Consistency pass
        let report = ConsistencyValidator::from_gateway(llm.clone(), &self.config)
            .validate(&mut record, &document)
            .await;

        // A closing date recovered by the consistency pass still yields a status
        if record.is_unspecified(Field::OpenStatus) {
            let status = generator.status(&record);
            if record.fill_if_unspecified(Field::OpenStatus, status) {
                info!("Open status derived from recovered closing date");
            }
        }

        let unresolved = record.unresolved_fields();
        if !unresolved.is_empty() {
            warn!(
                "Unresolved fields: {}",
                unresolved.iter().map(|field| field.key()).collect::<Vec<_>>().join(", ")
            );
        }

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        let metadata = ExtractionMetadata {
            run_id,
            source_id: request.source_id,
            model_name: llm.model_name(),
            fragment_count: document.fragment_count,
            page_count: document.page_count,
            document_chars: document.char_len(),
            fields_resolved: record.resolved_count(),
            fields_corrected: report.total_corrections(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::ZERO)
                .as_secs(),
            processing_time_ms,
        };

        info!(
            "Extraction run {} complete: {}/{} fields resolved in {} ms",
            run_id,
            metadata.fields_resolved,
            Field::ALL.len(),
            processing_time_ms
        );

        Ok(ExtractionOutcome { record, metadata })
    }

    fn retrieval(&self) -> RetrievalGateway<R> {
        RetrievalGateway::new(Arc::clone(&self.retriever), self.config.call_timeout())
    }
}
