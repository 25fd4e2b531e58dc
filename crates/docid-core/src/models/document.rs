//! Extracted document data.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Field parser selected by a document rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserKind {
    /// Taiwanese national ID card, front side.
    IdCardFront,
    /// Taiwanese national ID card, back side.
    IdCardBack,
    /// Passport data page.
    Passport,
    /// National health-insurance card.
    HealthCard,
    /// Transit card (EasyCard) transaction screenshot.
    TransitCard,
}

impl ParserKind {
    /// All parser kinds.
    pub const ALL: [ParserKind; 5] = [
        ParserKind::IdCardFront,
        ParserKind::IdCardBack,
        ParserKind::Passport,
        ParserKind::HealthCard,
        ParserKind::TransitCard,
    ];

    /// Stable identifier used in rule tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserKind::IdCardFront => "id_card_front",
            ParserKind::IdCardBack => "id_card_back",
            ParserKind::Passport => "passport",
            ParserKind::HealthCard => "health_card",
            ParserKind::TransitCard => "transit_card",
        }
    }
}

impl std::fmt::Display for ParserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields pulled from one document.
///
/// Every field a parser declares is present; a field whose pattern did not
/// match holds the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Parser that produced these fields.
    pub kind: ParserKind,

    /// Human-readable document type.
    pub type_label: String,

    /// Field name to extracted value.
    pub fields: BTreeMap<String, String>,

    /// Transaction rows (transit-card screenshots only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<TransitRecord>,

    /// Non-fatal problems met during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ExtractedFields {
    pub fn new(kind: ParserKind, type_label: impl Into<String>) -> Self {
        Self {
            kind,
            type_label: type_label.into(),
            fields: BTreeMap::new(),
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Set a field, trimming surrounding whitespace.
    pub fn set(&mut self, name: &str, value: impl AsRef<str>) {
        self.fields
            .insert(name.to_string(), value.as_ref().trim().to_string());
    }

    /// Set a field from an optional match; `None` stores the empty string.
    pub fn set_opt(&mut self, name: &str, value: Option<String>) {
        self.set(name, value.unwrap_or_default());
    }

    /// Value of a field, or the empty string when absent.
    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    /// Whether a field holds a non-empty value.
    pub fn is_filled(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    /// Names of declared fields that stayed empty.
    pub fn missing(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, v)| v.is_empty())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Means of transport inferred from a transaction's location text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Metro,
    Rail,
    HighSpeedRail,
    Coach,
    Bus,
    Taxi,
}

impl TransportMode {
    /// Label as printed on the transaction report.
    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Metro => "捷運",
            TransportMode::Rail => "台鐵",
            TransportMode::HighSpeedRail => "高鐵",
            TransportMode::Coach => "客運",
            TransportMode::Bus => "公車",
            TransportMode::Taxi => "計程車",
        }
    }
}

/// One fare deduction read from a transit-card screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitRecord {
    /// Transaction date.
    pub date: NaiveDate,

    /// Transaction time.
    pub time: NaiveTime,

    /// Inferred transport mode.
    pub mode: TransportMode,

    /// Station or route text left after removing date, time and amount.
    pub location: String,

    /// Fare in whole currency units, always non-negative.
    pub amount: u32,
}

impl TransitRecord {
    /// `MM/DD` form used in expense reports.
    pub fn short_date(&self) -> String {
        self.date.format("%m/%d").to_string()
    }
}
