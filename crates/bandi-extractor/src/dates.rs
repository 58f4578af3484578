//! Italian date expressions to `DD/MM/YYYY`
//!
//! Grant notices write dates as "28 marzo 2025", "1° aprile", "dal 15
//! aprile" or numerically with `/`, `-` or `.` separators. The
//! [`DateNormalizer`] turns one such expression into the canonical form,
//! borrowing the year from the surrounding text when it is missing.

use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Canonical date format of the record
pub const CANONICAL_FORMAT: &str = "%d/%m/%Y";

/// Italian month names and their numbers
pub const ITALIAN_MONTHS: [(&str, u32); 12] = [
    ("gennaio", 1),
    ("febbraio", 2),
    ("marzo", 3),
    ("aprile", 4),
    ("maggio", 5),
    ("giugno", 6),
    ("luglio", 7),
    ("agosto", 8),
    ("settembre", 9),
    ("ottobre", 10),
    ("novembre", 11),
    ("dicembre", 12),
];

static RE_TEXTUAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\s*[°º]?\s+(gennaio|febbraio|marzo|aprile|maggio|giugno|luglio|agosto|settembre|ottobre|novembre|dicembre)(?:\s+(\d{4}))?\b",
    )
    .expect("textual date pattern is valid")
});

static RE_NUMERIC: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b",
        r"\b(\d{1,2})-(\d{1,2})-(\d{4})\b",
        r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b",
    ]
    .map(|pattern| Regex::new(pattern).expect("numeric date pattern is valid"))
});

static RE_CANONICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("canonical date pattern is valid")
});

static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b((?:19|20)\d{2})\b").expect("year pattern is valid")
});

/// Number of an Italian month name, case-insensitive
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim().to_lowercase();
    ITALIAN_MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
}

/// Parse a `DD/MM/YYYY` string into a calendar date
///
/// The year must have exactly four digits.
pub fn parse_canonical(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if !RE_CANONICAL.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, CANONICAL_FORMAT).ok()
}

/// Render a date as `DD/MM/YYYY`
pub fn format_canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Deterministic parser for Italian date expressions
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer;

impl DateNormalizer {
    /// Create a normalizer
    pub fn new() -> Self {
        Self
    }

    /// Normalize the single date expressed in `text`
    ///
    /// A missing year is taken from the 4-digit years in `text`, or from
    /// `context` when `text` has none; exactly one distinct candidate year
    /// is required. Returns `None` when `text` names no date, names several
    /// distinct dates, names an impossible date, or leaves the year
    /// ambiguous.
    pub fn normalize(&self, text: &str, context: &str) -> Option<String> {
        let mut dates = BTreeSet::new();

        for captures in RE_TEXTUAL.captures_iter(text) {
            let day: u32 = captures[1].parse().ok()?;
            let month = month_from_name(&captures[2])?;
            let year = match captures.get(3) {
                Some(year) => year.as_str().parse().ok()?,
                None => infer_year(text, context)?,
            };
            dates.insert(NaiveDate::from_ymd_opt(year, month, day)?);
        }

        for pattern in RE_NUMERIC.iter() {
            for captures in pattern.captures_iter(text) {
                let day: u32 = captures[1].parse().ok()?;
                let month: u32 = captures[2].parse().ok()?;
                let year: i32 = captures[3].parse().ok()?;
                dates.insert(NaiveDate::from_ymd_opt(year, month, day)?);
            }
        }

        let mut dates = dates.into_iter();
        match (dates.next(), dates.next()) {
            (Some(date), None) => Some(format_canonical(date)),
            _ => None,
        }
    }
}

fn infer_year(text: &str, context: &str) -> Option<i32> {
    unique_year(text).or_else(|| {
        if distinct_years(text).is_empty() {
            unique_year(context)
        } else {
            None
        }
    })
}

fn unique_year(text: &str) -> Option<i32> {
    let years = distinct_years(text);
    if years.len() == 1 {
        years.into_iter().next()
    } else {
        None
    }
}

fn distinct_years(text: &str) -> BTreeSet<i32> {
    RE_YEAR
        .captures_iter(text)
        .filter_map(|captures| captures[1].parse().ok())
        .collect()
}
