//! Show command implementation.

use crate::cli::ShowArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use bandi_store::RecordStore;
use std::path::{Path, PathBuf};

/// Execute the show command.
pub async fn execute_show(args: ShowArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => config.get_active_profile()?.output_dir.clone(),
    };
    let store = RecordStore::new(dir);

    match args.file {
        Some(file) => {
            let path = resolve_record(&store, &file)?;
            let record = store.load(&path)?;
            println!("{}", formatter.format_record(&record_name(&path), &record)?);
        }
        None => {
            let records: Vec<_> = store
                .load_all()?
                .into_iter()
                .map(|(path, record)| (record_name(&path), record))
                .collect();
            println!("{}", formatter.format_records(&records)?);
        }
    }

    Ok(())
}

/// An existing path as given, otherwise the record a notice filename maps to.
fn resolve_record(store: &RecordStore, file: &str) -> Result<PathBuf> {
    let given = PathBuf::from(file);
    if given.is_file() {
        return Ok(given);
    }
    Ok(store.record_path(file)?)
}

fn record_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
