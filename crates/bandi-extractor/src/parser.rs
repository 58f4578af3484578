//! Parse LLM output of the consistency pass

use crate::error::ExtractorError;
use crate::prompt::NOT_FOUND_MARKER;
use bandi_domain::Field;
use serde_json::{Map, Value};
use tracing::debug;

/// Dates found by the date re-search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateLines {
    /// Value of the `Apertura:` line, if usable
    pub opening: Option<String>,
    /// Value of the `Chiusura:` line, if usable
    pub closing: Option<String>,
}

/// Parse the `Apertura: …` / `Chiusura: …` lines of a date re-search
///
/// A value is kept only when it contains `/` and is not the not-found
/// marker. The first usable line for each date wins. Fails when neither
/// marker appears at all.
pub fn parse_date_lines(response: &str) -> Result<DateLines, ExtractorError> {
    let mut lines = DateLines::default();
    let mut saw_marker = false;

    for line in response.lines() {
        if let Some(value) = value_after(line, "Apertura:") {
            saw_marker = true;
            if lines.opening.is_none() {
                lines.opening = usable_date(value);
            }
        } else if let Some(value) = value_after(line, "Chiusura:") {
            saw_marker = true;
            if lines.closing.is_none() {
                lines.closing = usable_date(value);
            }
        }
    }

    if !saw_marker {
        return Err(ExtractorError::ParseMismatch(
            "No 'Apertura:' or 'Chiusura:' line in response".to_string(),
        ));
    }
    Ok(lines)
}

fn value_after<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.find(marker)
        .map(|index| line[index + marker.len()..].trim())
}

fn usable_date(value: &str) -> Option<String> {
    let value = value.trim_matches(|c: char| matches!(c, '"' | '[' | ']' | '*') || c.is_whitespace());
    if value.contains('/') && value != NOT_FOUND_MARKER {
        Some(value.to_string())
    } else {
        None
    }
}

/// The span from the first `{` to the last `}`
pub fn extract_json_object(response: &str) -> Result<&str, ExtractorError> {
    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&response[start..=end]),
        _ => Err(ExtractorError::ParseMismatch(
            "No JSON object in response".to_string(),
        )),
    }
}

/// Parse the corrected record of a cross-check
///
/// Returns the string values whose key names a record field. Unknown keys
/// and non-string values are skipped.
pub fn parse_cross_check(response: &str) -> Result<Vec<(Field, String)>, ExtractorError> {
    let json_str = extract_json_object(response)?;
    let object: Map<String, Value> = serde_json::from_str(json_str)?;

    let mut corrections = Vec::new();
    for (key, value) in object {
        match (Field::from_key(&key), value) {
            (Some(field), Value::String(text)) => corrections.push((field, text)),
            (Some(_), other) => debug!("Skipping non-string value for '{}': {}", key, other),
            (None, _) => debug!("Skipping unknown key '{}'", key),
        }
    }
    Ok(corrections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_lines() {
        let response = "Ecco le date:\nApertura: 15/04/2025\nChiusura: 30/06/2025\n";
        let lines = parse_date_lines(response).unwrap();
        assert_eq!(lines.opening.as_deref(), Some("15/04/2025"));
        assert_eq!(lines.closing.as_deref(), Some("30/06/2025"));
    }

    #[test]
    fn test_parse_date_lines_not_found() {
        let lines = parse_date_lines("Apertura: Non trovata\nChiusura: 30 giugno").unwrap();
        assert_eq!(lines, DateLines::default());
    }

    #[test]
    fn test_parse_date_lines_tolerates_decoration() {
        let lines = parse_date_lines("- **Apertura:** \"01/03/2025\"").unwrap();
        assert_eq!(lines.opening.as_deref(), Some("01/03/2025"));

        let lines = parse_date_lines("- Apertura: \"01/03/2025\"").unwrap();
        assert_eq!(lines.opening.as_deref(), Some("01/03/2025"));
    }

    #[test]
    fn test_parse_date_lines_without_markers() {
        assert!(matches!(
            parse_date_lines("Non ho trovato nulla"),
            Err(ExtractorError::ParseMismatch(_))
        ));
    }

    #[test]
    fn test_extract_json_object() {
        let response = "Ecco il JSON corretto:\n```json\n{\"a\": {\"b\": 1}}\n```";
        assert_eq!(extract_json_object(response).unwrap(), "{\"a\": {\"b\": 1}}");
        assert!(extract_json_object("nessun json").is_err());
        assert!(extract_json_object("} al contrario {").is_err());
    }

    #[test]
    fn test_parse_cross_check() {
        let response = r#"{"Beneficiari": "PMI", "Aperto": 1, "Altro": "x", "Chiusura": "30/06/2025"}"#;
        let corrections = parse_cross_check(response).unwrap();
        assert_eq!(corrections.len(), 2);
        assert!(corrections.contains(&(Field::Beneficiaries, "PMI".to_string())));
        assert!(corrections.contains(&(Field::ClosingDate, "30/06/2025".to_string())));
    }

    #[test]
    fn test_parse_cross_check_invalid_json() {
        assert!(matches!(
            parse_cross_check("{non è json}"),
            Err(ExtractorError::ParseMismatch(_))
        ));
    }
}
