//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::commands::load_index;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::provider::Provider;
use bandi_domain::traits::{FragmentRetriever, LlmProvider};
use bandi_extractor::{
    ExtractionOutcome, ExtractionPipeline, ExtractionRequest, ExtractorConfig, WaitOutcome,
};
use bandi_store::RecordStore;
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;
    let extractor_config: ExtractorConfig = match args.preset {
        Some(preset) => preset.into(),
        None => config.extractor.clone(),
    };

    let index = load_index(config, args.index.as_deref())?;
    let provider = Provider::from_profile(profile, extractor_config.call_timeout())?;
    let pipeline = Arc::new(ExtractionPipeline::new(provider, index, extractor_config)?);

    let request = match (args.source, args.description) {
        (Some(source), _) => {
            let filename = args.filename.unwrap_or_else(|| display_filename(&source));
            ExtractionRequest::new(source, filename)
        }
        (None, Some(_)) if args.filename.is_some() => {
            return Err(CliError::InvalidInput(
                "--filename can only be used with --source".to_string(),
            ))
        }
        (None, Some(description)) => {
            let found = pipeline.locator().locate(&description).await?;
            println!("{}", formatter.info(&format!("Located {}", found.filename)));
            found.into()
        }
        (None, None) => {
            return Err(CliError::InvalidInput(
                "Either --description or --source is required".to_string(),
            ))
        }
    };
    let filename = request.filename.clone();

    let outcome = run_extraction(
        &pipeline,
        request,
        Duration::from_secs(args.wait),
        Duration::from_secs(args.grace),
    )
    .await?;

    let output_dir = args.output.unwrap_or_else(|| profile.output_dir.clone());
    let path = RecordStore::new(output_dir).save(&filename, &outcome.record)?;

    println!("{}", formatter.format_record(&filename, &outcome.record)?);
    println!("{}", formatter.format_metadata(&outcome.metadata)?);
    println!("{}", formatter.success(&format!("Saved {}", path.display())));
    Ok(())
}

/// Run one extraction in the background with a bounded wait and a grace period.
pub(crate) async fn run_extraction<L, R>(
    pipeline: &Arc<ExtractionPipeline<L, R>>,
    request: ExtractionRequest,
    wait: Duration,
    grace: Duration,
) -> Result<ExtractionOutcome>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    R: FragmentRetriever + Send + Sync + 'static,
    R::Error: Display,
{
    let task = pipeline.spawn(request);
    info!("Waiting for run {} ({})", task.run_id(), task.source_id());

    match task.wait_with_grace(wait, grace).await {
        WaitOutcome::Completed(result) => Ok(result?),
        WaitOutcome::StillRunning(task) => Err(CliError::StillRunning {
            run_id: task.run_id().to_string(),
            source_id: task.source_id().to_string(),
        }),
    }
}

/// Last path component of a source identifier.
fn display_filename(source: &str) -> String {
    Path::new(source)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(source)
        .to_string()
}
