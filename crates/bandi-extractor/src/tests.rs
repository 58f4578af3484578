//! Integration tests for the extraction pipeline

#[cfg(test)]
mod tests {
    use crate::{
        CrossCheckPolicy, ExtractionPipeline, ExtractionRequest, ExtractorConfig, ExtractorError,
        FixedClock, WaitOutcome, DESCRIPTION_FALLBACK, KEYWORDS_FALLBACK, STANDARD_FIELDS,
    };
    use bandi_domain::traits::FragmentRetriever;
    use bandi_domain::{Field, Fragment, Unresolved, UNSPECIFIED};
    use bandi_llm::MockProvider;
    use bandi_store::InMemoryFragmentIndex;
    use chrono::NaiveDate;
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::time::Duration;

    const SOURCE: &str = "bandi/bando_digitale.pdf";
    const FILENAME: &str = "Bando Digitale 2025.pdf";

    fn notice_index() -> InMemoryFragmentIndex {
        InMemoryFragmentIndex::from_fragments(vec![
            Fragment::new("Soggetti beneficiari: micro, piccole e medie imprese lombarde", SOURCE, 3),
            Fragment::new(
                "Le domande possono essere presentate dal 28 marzo 2025 fino al 30 giugno 2025",
                SOURCE,
                3,
            ),
            Fragment::new("REGIONE LOMBARDIA - Direzione Generale Sviluppo Economico", SOURCE, 1)
                .with_metadata("filename", FILENAME),
            Fragment::new(
                "OGGETTO: Bando Digitale 2025 per la trasformazione digitale delle PMI",
                SOURCE,
                1,
            ),
            Fragment::new("Dotazione finanziaria complessiva: € 5.000.000", SOURCE, 2),
            Fragment::new("Contributo a fondo perduto fino a € 50.000 per impresa", SOURCE, 2),
            Fragment::new("Art. 5 - Spese ammissibili per software e consulenza. ".repeat(12), SOURCE, 4),
            Fragment::new("Bando agricoltura sostenibile 2024", "bandi/agricoltura.pdf", 1),
        ])
    }

    fn scripted_llm() -> MockProvider {
        let mut llm = MockProvider::new(UNSPECIFIED);
        llm.add_response(
            "Verifica questi dati",
            r#"{"Ente erogatore": "Altro ente", "Aperto": "no"}"#,
        );
        llm.add_response("trova le date di apertura", "Apertura: 01/01/2025\nChiusura: 01/02/2025");
        llm.add_response(
            "valore per \"Ente erogatore\"",
            "Regione Lombardia - DG Sviluppo Economico",
        );
        llm.add_response("valore per \"Titolo dell'avviso\"", "Bando Digitale 2025");
        llm.add_response("estrai la data di apertura", "28 marzo 2025");
        llm.add_response("estrai la data di chiusura", "30/06/2025");
        llm.add_response("valore per \"Dotazione finanziaria\"", "€ 5.000.000");
        llm.add_response("valore per \"Contributo\"", "Fino a € 50.000 a fondo perduto");
        llm.add_response("valore per \"Beneficiari\"", "Micro, piccole e medie imprese lombarde");
        llm.add_response("descrizione sintetica", "Sostiene la trasformazione digitale delle PMI lombarde.");
        llm.add_response("parole chiave", "digitale, PMI, Lombardia, fondo perduto, innovazione");
        llm
    }

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2025, 4, 30).unwrap())
    }

    fn pipeline(llm: MockProvider) -> ExtractionPipeline<MockProvider, InMemoryFragmentIndex> {
        ExtractionPipeline::new(llm, notice_index(), ExtractorConfig::default())
            .unwrap()
            .with_clock(clock())
    }

    fn request() -> ExtractionRequest {
        ExtractionRequest::new(SOURCE, FILENAME)
    }

    #[tokio::test]
    async fn test_full_extraction_flow() {
        let llm = scripted_llm();
        let outcome = pipeline(llm.clone()).run(request()).await.unwrap();
        let record = &outcome.record;

        assert_eq!(record.value_str(Field::IssuingBody), "Regione Lombardia - DG Sviluppo Economico");
        assert_eq!(record.value_str(Field::NoticeTitle), "Bando Digitale 2025");
        assert_eq!(record.value_str(Field::OpeningDate), "28/03/2025");
        assert_eq!(record.value_str(Field::ClosingDate), "30/06/2025");
        assert_eq!(record.value_str(Field::TotalFunding), "€ 5.000.000");
        assert_eq!(record.value_str(Field::Contribution), "Fino a € 50.000 a fondo perduto");
        assert_eq!(
            record.value_str(Field::Beneficiaries),
            "Micro, piccole e medie imprese lombarde"
        );
        assert_eq!(
            record.value_str(Field::AdditionalDescription),
            "Sostiene la trasformazione digitale delle PMI lombarde."
        );
        assert_eq!(
            record.value_str(Field::Keywords),
            "digitale, PMI, Lombardia, fondo perduto, innovazione"
        );
        assert_eq!(record.value_str(Field::OpenStatus), "si");
        assert_eq!(record.value_str(Field::SourceFilename), FILENAME);
        assert!(record.is_complete());

        let metadata = &outcome.metadata;
        assert_eq!(metadata.source_id, SOURCE);
        assert_eq!(metadata.model_name, "mock");
        assert_eq!(metadata.fragment_count, 7);
        assert_eq!(metadata.page_count, 4);
        assert_eq!(metadata.fields_resolved, 11);
        assert_eq!(metadata.fields_corrected, 0);
    }

    #[tokio::test]
    async fn test_fields_are_extracted_in_fixed_order() {
        let llm = scripted_llm();
        pipeline(llm.clone()).run(request()).await.unwrap();

        let prompts = llm.prompts();
        let needles = [
            "valore per \"Ente erogatore\"",
            "valore per \"Titolo dell'avviso\"",
            "estrai la data di apertura",
            "estrai la data di chiusura",
            "valore per \"Dotazione finanziaria\"",
            "valore per \"Contributo\"",
            "valore per \"Beneficiari\"",
            "descrizione sintetica",
            "parole chiave",
            "Verifica questi dati",
        ];
        assert_eq!(prompts.len(), needles.len());
        for (prompt, needle) in prompts.iter().zip(needles) {
            assert!(prompt.contains(needle), "expected '{}' in prompt", needle);
        }

        // Field context never leaks the other notice
        assert!(prompts.iter().take(7).all(|prompt| !prompt.contains("agricoltura")));
    }

    #[tokio::test]
    async fn test_failing_model_gives_sentinel_record() {
        let outcome = pipeline(MockProvider::failing("modello non raggiungibile"))
            .run(request())
            .await
            .unwrap();
        let record = &outcome.record;

        for spec in &STANDARD_FIELDS {
            assert!(matches!(
                record.get(spec.field).unresolved(),
                Some(Unresolved::Failed { .. })
            ));
            assert_eq!(record.value_str(spec.field), UNSPECIFIED);
        }
        assert_eq!(record.value_str(Field::AdditionalDescription), DESCRIPTION_FALLBACK);
        assert_eq!(record.value_str(Field::Keywords), KEYWORDS_FALLBACK);
        assert_eq!(record.value_str(Field::OpenStatus), UNSPECIFIED);
        assert_eq!(record.value_str(Field::SourceFilename), FILENAME);

        let json = serde_json::to_value(record).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), Field::ALL.len());
        for field in Field::ALL {
            assert!(object[field.key()].is_string());
        }
    }

    #[tokio::test]
    async fn test_unready_retrieval_aborts_run() {
        let llm = MockProvider::new("x");
        let pipeline =
            ExtractionPipeline::new(llm.clone(), InMemoryFragmentIndex::new(), ExtractorConfig::default())
                .unwrap();

        let result = pipeline.run(request()).await;
        assert!(matches!(result, Err(ExtractorError::RetrievalUnavailable)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_source_aborts_before_extraction() {
        let llm = MockProvider::new("x");
        let result = pipeline(llm.clone())
            .run(ExtractionRequest::new("bandi/inesistente.pdf", "inesistente.pdf"))
            .await;

        match result {
            Err(e @ ExtractorError::ReconstructionEmpty(_)) => assert!(e.is_fatal()),
            other => panic!("unexpected result: {:?}", other.map(|o| o.record)),
        }
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_consistency_pass_recovers_dates_and_status() {
        let mut llm = MockProvider::new(UNSPECIFIED);
        llm.add_response(
            "trova le date di apertura",
            "Apertura: 28/03/2025\nChiusura: 30/06/2025",
        );

        let outcome = pipeline(llm).run(request()).await.unwrap();
        let record = &outcome.record;

        assert_eq!(record.value_str(Field::OpeningDate), "28/03/2025");
        assert_eq!(record.value_str(Field::ClosingDate), "30/06/2025");
        assert_eq!(record.value_str(Field::OpenStatus), "si");
        assert_eq!(outcome.metadata.fields_corrected, 2);
    }

    #[tokio::test]
    async fn test_cross_check_never_overwrites_resolved_fields() {
        let mut llm = MockProvider::new(UNSPECIFIED);
        llm.add_response(
            "Verifica questi dati",
            r#"{"Ente erogatore": "Ente sbagliato", "Contributo": "Fino a € 50.000", "Beneficiari": "Non specificato"}"#,
        );
        llm.add_response("valore per \"Ente erogatore\"", "Regione Lombardia");

        let outcome = pipeline(llm).run(request()).await.unwrap();
        let record = &outcome.record;

        assert_eq!(record.value_str(Field::IssuingBody), "Regione Lombardia");
        assert_eq!(record.value_str(Field::Contribution), "Fino a € 50.000");
        assert_eq!(record.value_str(Field::Beneficiaries), UNSPECIFIED);
        assert_eq!(outcome.metadata.fields_corrected, 1);
    }

    #[tokio::test]
    async fn test_cross_check_policy_when_unresolved() {
        let llm = scripted_llm();
        let config = ExtractorConfig {
            cross_check: CrossCheckPolicy::WhenUnresolved,
            ..Default::default()
        };
        let pipeline = ExtractionPipeline::new(llm.clone(), notice_index(), config)
            .unwrap()
            .with_clock(clock());

        let outcome = pipeline.run(request()).await.unwrap();
        assert!(outcome.record.is_complete());
        assert!(llm.prompts().iter().all(|p| !p.contains("Verifica questi dati")));
    }

    #[tokio::test]
    async fn test_spawned_run_completes() {
        let pipeline = Arc::new(pipeline(scripted_llm()));
        let task = pipeline.spawn(request());
        let run_id = task.run_id();
        assert_eq!(task.source_id(), SOURCE);

        match task
            .wait_with_grace(Duration::from_secs(10), Duration::from_secs(10))
            .await
        {
            WaitOutcome::Completed(Ok(outcome)) => {
                assert_eq!(outcome.metadata.run_id, run_id);
                assert!(outcome.record.is_complete());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawned_run_reports_fatal_error() {
        let pipeline = Arc::new(pipeline(MockProvider::new("x")));
        let task = pipeline.spawn(ExtractionRequest::new("nessuno", "nessuno.pdf"));

        let result = task.join().await;
        assert!(matches!(result, Err(ExtractorError::ReconstructionEmpty(_))));
    }

    #[tokio::test]
    async fn test_locate_then_extract() {
        let pipeline = pipeline(scripted_llm());
        let found = pipeline
            .locator()
            .locate("Impresa lombarda interessata alla trasformazione digitale")
            .await
            .unwrap();
        assert_eq!(found.source_id, SOURCE);
        // Best hit carries no filename metadata
        assert_eq!(found.filename, "bando_digitale.pdf");

        let outcome = pipeline.run(found.into()).await.unwrap();
        assert_eq!(
            outcome.record.value_str(Field::SourceFilename),
            "bando_digitale.pdf"
        );
    }

    /// Ready backend that never finds anything
    struct EmptyResults;

    impl FragmentRetriever for EmptyResults {
        type Error = Infallible;

        fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<Fragment>, Self::Error> {
            Ok(Vec::new())
        }
    }

    /// Whole documents load, every similarity search errors
    struct SearchFails;

    impl FragmentRetriever for SearchFails {
        type Error = String;

        fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<Fragment>, Self::Error> {
            Err("indice non raggiungibile".to_string())
        }

        fn fragments_for_source(&self, source_id: &str) -> Result<Option<Vec<Fragment>>, Self::Error> {
            Ok(notice_index().fragments_for_source(source_id).ok().flatten())
        }
    }

    #[tokio::test]
    async fn test_search_failures_leave_fields_unspecified() {
        let mut llm = MockProvider::new(UNSPECIFIED);
        llm.add_response("descrizione sintetica", "Sostiene la trasformazione digitale delle PMI lombarde.");
        llm.add_response("parole chiave", "digitale, PMI, Lombardia");
        let pipeline = ExtractionPipeline::new(llm, SearchFails, ExtractorConfig::default())
            .unwrap()
            .with_clock(clock());

        let outcome = pipeline.run(request()).await.unwrap();
        let record = &outcome.record;

        for spec in STANDARD_FIELDS.iter() {
            assert!(
                matches!(record.get(spec.field).unresolved(), Some(Unresolved::Failed { .. })),
                "{} should have failed",
                spec.field
            );
        }
        assert_eq!(record.value_str(Field::OpenStatus), UNSPECIFIED);
        assert_eq!(record.value_str(Field::Keywords), "digitale, PMI, Lombardia");
        assert_eq!(record.value_str(Field::SourceFilename), FILENAME);

        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 11);
        assert_eq!(outcome.metadata.fragment_count, 7);
    }

    #[tokio::test]
    async fn test_locate_without_hits() {
        let pipeline =
            ExtractionPipeline::new(MockProvider::default(), EmptyResults, ExtractorConfig::default())
                .unwrap();
        let result = pipeline.locator().locate("qualsiasi").await;
        assert!(matches!(result, Err(ExtractorError::DocumentNotFound)));
    }

    #[tokio::test]
    async fn test_custom_field_subset() {
        let llm = scripted_llm();
        let pipeline = pipeline(llm.clone()).with_fields(vec![STANDARD_FIELDS[0]]);

        let outcome = pipeline.run(request()).await.unwrap();
        assert_eq!(
            outcome.record.value_str(Field::IssuingBody),
            "Regione Lombardia - DG Sviluppo Economico"
        );
        assert!(matches!(
            outcome.record.get(Field::NoticeTitle).unresolved(),
            Some(Unresolved::Pending)
        ));
        let field_prompts = llm
            .prompts()
            .iter()
            .filter(|p| p.contains("Dai seguenti contesti"))
            .count();
        assert_eq!(field_prompts, 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ExtractorConfig {
            field_search_k: 0,
            ..Default::default()
        };
        let result = ExtractionPipeline::new(MockProvider::default(), notice_index(), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }
}
