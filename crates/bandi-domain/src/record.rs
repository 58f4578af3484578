//! The structured record extracted from one grant notice

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Terminal value of a field that could not be resolved
pub const UNSPECIFIED: &str = "Non specificato";

/// The eleven canonical keys of an [`ExtractionRecord`]
///
/// Declaration order is the serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Body issuing the notice (region, chamber of commerce, ministry)
    IssuingBody,
    /// Official title of the notice
    NoticeTitle,
    /// Short synthesis of what the notice funds
    AdditionalDescription,
    /// Who may apply
    Beneficiaries,
    /// First day applications are accepted (`DD/MM/YYYY`)
    OpeningDate,
    /// Last day applications are accepted (`DD/MM/YYYY`)
    ClosingDate,
    /// Total budget of the notice
    TotalFunding,
    /// Kind and amount of the contribution per beneficiary
    Contribution,
    /// Comma-separated keywords
    Keywords,
    /// `"si"` when still open, `"no"` when closed
    OpenStatus,
    /// Display filename of the source document
    SourceFilename,
}

impl Field {
    /// All fields in canonical order
    pub const ALL: [Field; 11] = [
        Field::IssuingBody,
        Field::NoticeTitle,
        Field::AdditionalDescription,
        Field::Beneficiaries,
        Field::OpeningDate,
        Field::ClosingDate,
        Field::TotalFunding,
        Field::Contribution,
        Field::Keywords,
        Field::OpenStatus,
        Field::SourceFilename,
    ];

    /// Key used in the serialized record
    pub fn key(self) -> &'static str {
        match self {
            Field::IssuingBody => "Ente erogatore",
            Field::NoticeTitle => "Titolo dell'avviso",
            Field::AdditionalDescription => "Descrizione aggiuntiva",
            Field::Beneficiaries => "Beneficiari",
            Field::OpeningDate => "Apertura",
            Field::ClosingDate => "Chiusura",
            Field::TotalFunding => "Dotazione finanziaria",
            Field::Contribution => "Contributo",
            Field::Keywords => "Parole chiave",
            Field::OpenStatus => "Aperto",
            Field::SourceFilename => "Nome file",
        }
    }

    /// Look a field up by its serialized key
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.key() == key)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why a field has no value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// Not attempted yet
    Pending,
    /// The model answered that the document has no such information
    NotFound,
    /// The model answered, but the value failed the field's validator
    Rejected {
        /// The rejected answer
        raw: String,
    },
    /// A retrieval or model call failed
    Failed {
        /// Error description
        reason: String,
    },
}

/// Value of one record slot
///
/// Every `Unspecified` variant renders as [`UNSPECIFIED`]; the
/// [`Unresolved`] reason only exists in memory so callers can tell a
/// failed call apart from a document that simply lacks the information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A real value
    Resolved(String),
    /// No value, with the reason
    Unspecified(Unresolved),
}

impl FieldValue {
    /// Build a value from a model answer
    ///
    /// Empty answers and the sentinel itself become `Unspecified(NotFound)`.
    pub fn from_answer(answer: impl Into<String>) -> Self {
        let answer = answer.into();
        let trimmed = answer.trim();
        if trimmed.is_empty() || trimmed == UNSPECIFIED {
            FieldValue::Unspecified(Unresolved::NotFound)
        } else {
            FieldValue::Resolved(trimmed.to_string())
        }
    }

    /// Shorthand for a failed resolution
    pub fn failed(reason: impl Into<String>) -> Self {
        FieldValue::Unspecified(Unresolved::Failed {
            reason: reason.into(),
        })
    }

    /// Shorthand for a validator rejection
    pub fn rejected(raw: impl Into<String>) -> Self {
        FieldValue::Unspecified(Unresolved::Rejected { raw: raw.into() })
    }

    /// Whether the value is real
    pub fn is_resolved(&self) -> bool {
        matches!(self, FieldValue::Resolved(_))
    }

    /// The value as it appears in the serialized record
    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Resolved(value) => value,
            FieldValue::Unspecified(_) => UNSPECIFIED,
        }
    }

    /// The reason this value is unspecified, if it is
    pub fn unresolved(&self) -> Option<&Unresolved> {
        match self {
            FieldValue::Resolved(_) => None,
            FieldValue::Unspecified(reason) => Some(reason),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Unspecified(Unresolved::Pending)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured description of one grant notice
///
/// Always holds exactly the eleven [`Field`] slots. A fresh record has every
/// slot `Unspecified(Pending)`; the pipeline fills it field by field.
///
/// # Examples
///
/// ```
/// use bandi_domain::{ExtractionRecord, Field, FieldValue, UNSPECIFIED};
///
/// let mut record = ExtractionRecord::new();
/// record.set(Field::NoticeTitle, FieldValue::from_answer("BANDO SMART WORKING 2024"));
///
/// assert_eq!(record.value_str(Field::NoticeTitle), "BANDO SMART WORKING 2024");
/// assert_eq!(record.value_str(Field::ClosingDate), UNSPECIFIED);
///
/// // Resolved fields are never replaced by a fill
/// assert!(!record.fill_if_unspecified(Field::NoticeTitle, FieldValue::from_answer("Altro")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionRecord {
    values: [FieldValue; 11],
}

impl ExtractionRecord {
    /// Create a record with every field pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field
    pub fn get(&self, field: Field) -> &FieldValue {
        &self.values[field.index()]
    }

    /// Serialized string of a field (sentinel when unspecified)
    pub fn value_str(&self, field: Field) -> &str {
        self.get(field).as_str()
    }

    /// Whether a field is still unspecified
    pub fn is_unspecified(&self, field: Field) -> bool {
        !self.get(field).is_resolved()
    }

    /// Overwrite a field
    pub fn set(&mut self, field: Field, value: FieldValue) {
        self.values[field.index()] = value;
    }

    /// Fill a field only if it is unspecified and `value` is resolved
    ///
    /// Returns `true` when the record changed.
    pub fn fill_if_unspecified(&mut self, field: Field, value: FieldValue) -> bool {
        if self.is_unspecified(field) && value.is_resolved() {
            self.set(field, value);
            true
        } else {
            false
        }
    }

    /// Iterate fields in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        Field::ALL.into_iter().map(move |field| (field, self.get(field)))
    }

    /// Fields that are still unspecified
    pub fn unresolved_fields(&self) -> Vec<Field> {
        self.iter()
            .filter(|(_, value)| !value.is_resolved())
            .map(|(field, _)| field)
            .collect()
    }

    /// Number of resolved fields
    pub fn resolved_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_resolved()).count()
    }

    /// Whether every field is resolved
    pub fn is_complete(&self) -> bool {
        self.resolved_count() == Field::ALL.len()
    }

    /// Serialized key/value pairs in canonical order
    pub fn to_pairs(&self) -> Vec<(&'static str, &str)> {
        self.iter().map(|(field, value)| (field.key(), value.as_str())).collect()
    }
}

impl Serialize for ExtractionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::ALL.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), value.as_str())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExtractionRecord {
    /// Unknown keys are ignored; missing keys and sentinels become `NotFound`
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut record = ExtractionRecord::new();
        for field in Field::ALL {
            let value = raw
                .get(field.key())
                .map(|value| FieldValue::from_answer(value.as_str()))
                .unwrap_or(FieldValue::Unspecified(Unresolved::NotFound));
            record.set(field, value);
        }
        Ok(record)
    }
}
