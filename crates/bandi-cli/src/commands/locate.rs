//! Locate command implementation.

use crate::cli::LocateArgs;
use crate::commands::load_index;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use bandi_extractor::DocumentLocator;
use std::sync::Arc;

/// Execute the locate command.
pub async fn execute_locate(args: LocateArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if args.description.trim().is_empty() {
        return Err(CliError::InvalidInput("Description must not be empty".to_string()));
    }

    let index = load_index(config, args.index.as_deref())?;
    let locator = DocumentLocator::new(Arc::new(index), &config.extractor);
    let found = locator.locate(&args.description).await?;

    println!("{}", formatter.format_match(&found)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[tokio::test]
    async fn test_empty_description_is_rejected() {
        let args = LocateArgs {
            description: "   ".to_string(),
            index: None,
        };
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = execute_locate(args, &Config::default(), &formatter).await;
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_missing_index_file() {
        let args = LocateArgs {
            description: "agricoltura".to_string(),
            index: Some("/nonexistent/fragments.json".to_string()),
        };
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = execute_locate(args, &Config::default(), &formatter).await;
        assert!(matches!(result, Err(CliError::Store(_))));
    }
}
