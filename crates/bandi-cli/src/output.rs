//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use bandi_domain::{ExtractionRecord, Field};
use bandi_extractor::{DocumentMatch, ExtractionMetadata};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const MAX_CELL_CHARS: usize = 80;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format one record under the name it is stored as.
    pub fn format_record(&self, name: &str, record: &ExtractionRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
            OutputFormat::Table => Ok(format!(
                "{}\n{}",
                self.record_heading(name, record),
                self.record_table(record)
            )),
            OutputFormat::Quiet => Ok(record.value_str(Field::NoticeTitle).to_string()),
        }
    }

    /// Format several stored records.
    pub fn format_records(&self, records: &[(String, ExtractionRecord)]) -> Result<String> {
        if records.is_empty() {
            return Ok(self.colorize("No records found.", "yellow"));
        }

        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = records
                    .iter()
                    .map(|(name, record)| {
                        serde_json::json!({
                            "file": name,
                            "record": record,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                let tables: Vec<String> = records
                    .iter()
                    .map(|(name, record)| {
                        format!("{}\n{}", self.record_heading(name, record), self.record_table(record))
                    })
                    .collect();
                Ok(tables.join("\n\n"))
            }
            OutputFormat::Quiet => Ok(records
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format a located document.
    pub fn format_match(&self, found: &DocumentMatch) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "source_id": found.source_id,
                "filename": found.filename,
            }))?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Source", "Filename"]);
                builder.push_record([found.source_id.as_str(), found.filename.as_str()]);
                Ok(finish_table(builder))
            }
            OutputFormat::Quiet => Ok(found.source_id.clone()),
        }
    }

    /// Format the bookkeeping of a finished run.
    pub fn format_metadata(&self, metadata: &ExtractionMetadata) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "run_id": metadata.run_id.to_string(),
                "source_id": metadata.source_id,
                "model": metadata.model_name,
                "fragments": metadata.fragment_count,
                "pages": metadata.page_count,
                "document_chars": metadata.document_chars,
                "fields_resolved": metadata.fields_resolved,
                "fields_corrected": metadata.fields_corrected,
                "timestamp": metadata.timestamp,
                "processing_time_ms": metadata.processing_time_ms,
            }))?),
            OutputFormat::Table => Ok(self.info(&format!(
                "Run {}: {} fragments over {} pages, {}/{} fields resolved ({} corrected) by {} in {} ms",
                metadata.run_id,
                metadata.fragment_count,
                metadata.page_count,
                metadata.fields_resolved,
                Field::ALL.len(),
                metadata.fields_corrected,
                metadata.model_name,
                metadata.processing_time_ms
            ))),
            OutputFormat::Quiet => Ok(metadata.run_id.to_string()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn record_heading(&self, name: &str, record: &ExtractionRecord) -> String {
        let completeness = format!("{}/{}", record.resolved_count(), Field::ALL.len());
        let color = if record.is_complete() { "green" } else { "yellow" };
        format!("{} ({})", self.colorize(name, "cyan"), self.colorize(&completeness, color))
    }

    fn record_table(&self, record: &ExtractionRecord) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (field, value) in record.iter() {
            builder.push_record([field.key().to_string(), truncate(value.as_str(), MAX_CELL_CHARS)]);
        }
        finish_table(builder)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn finish_table(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

/// Shorten `text` to `max_chars` characters for a table cell.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}…", &text[..end]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandi_domain::FieldValue;

    fn create_test_record() -> ExtractionRecord {
        let mut record = ExtractionRecord::new();
        record.set(Field::IssuingBody, FieldValue::from_answer("Regione Lombardia"));
        record.set(Field::NoticeTitle, FieldValue::from_answer("Bando Digitale 2025"));
        record.set(Field::ClosingDate, FieldValue::from_answer("30/06/2025"));
        record
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_record("bando.json", &create_test_record()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["Ente erogatore"], "Regione Lombardia");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_record("bando.json", &create_test_record()).unwrap();
        assert!(output.starts_with("bando.json (3/11)"));
        assert!(output.contains("Bando Digitale 2025"));
        assert!(output.contains("Non specificato"));
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let records = vec![
            ("a.json".to_string(), create_test_record()),
            ("b.json".to_string(), ExtractionRecord::new()),
        ];
        assert_eq!(formatter.format_records(&records).unwrap(), "a.json\nb.json");
    }

    #[test]
    fn test_empty_records() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.format_records(&[]).unwrap(), "No records found.");
    }

    #[test]
    fn test_match_format() {
        let found = DocumentMatch {
            source_id: "bandi/digit.pdf".to_string(),
            filename: "Bando Digitale.pdf".to_string(),
        };
        let quiet = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(quiet.format_match(&found).unwrap(), "bandi/digit.pdf");

        let table = Formatter::new(OutputFormat::Table, false);
        assert!(table.format_match(&found).unwrap().contains("Bando Digitale.pdf"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("perché sì", 6), "perché…");
        assert_eq!(truncate("breve", 80), "breve");
    }

    #[test]
    fn test_messages_without_color() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("Done"), "✓ Done");
        assert_eq!(formatter.error("Failed"), "✗ Failed");
        assert_eq!(formatter.warning("Careful"), "⚠ Careful");
    }
}
