//! JSON persistence for extraction records

use crate::StoreError;
use bandi_domain::ExtractionRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory of one JSON file per extracted notice
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    /// Create a store rooted at `dir` (created on first save)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a record for `filename` is written to
    ///
    /// `bando.pdf` and `bando.PDF` map to `bando.json`; other names get a
    /// `.json` suffix appended.
    pub fn record_path(&self, filename: &str) -> Result<PathBuf, StoreError> {
        let name = Path::new(filename.trim())
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StoreError::InvalidFilename(filename.to_string()))?;

        let stem = name
            .strip_suffix(".pdf")
            .or_else(|| name.strip_suffix(".PDF"))
            .unwrap_or(name);
        if stem.is_empty() {
            return Err(StoreError::InvalidFilename(filename.to_string()));
        }

        Ok(self.dir.join(format!("{}.json", stem)))
    }

    /// Write a record, overwriting an earlier extraction of the same file
    pub fn save(&self, filename: &str, record: &ExtractionRecord) -> Result<PathBuf, StoreError> {
        let path = self.record_path(filename)?;

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        if path.exists() {
            warn!("Overwriting existing record {}", path.display());
        }

        let contents = serde_json::to_string_pretty(record).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(&path, contents).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;

        info!(
            "Saved record {} ({}/{} fields resolved)",
            path.display(),
            record.resolved_count(),
            bandi_domain::Field::ALL.len()
        );
        Ok(path)
    }

    /// Read one record file
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ExtractionRecord, StoreError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Read every `*.json` record, sorted by path
    ///
    /// Unreadable files are logged and skipped.
    pub fn load_all(&self) -> Result<Vec<(PathBuf, ExtractionRecord)>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            match self.load(&path) {
                Ok(record) => records.push((path, record)),
                Err(e) => warn!("Skipping unreadable record: {}", e),
            }
        }
        Ok(records)
    }
}
