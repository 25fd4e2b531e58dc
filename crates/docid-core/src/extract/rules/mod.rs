//! Rule-based field extractors shared by the document parsers.

pub mod address;
pub mod dates;
pub mod digits;
pub mod mrz;
pub mod names;
pub mod national_id;
pub mod patterns;

pub use address::join_address_lines;
pub use dates::{earliest_roc_date, latest_roc_date, month_name_dates, RocDate, RocDateExtractor};
pub use digits::{exact_digit_run, standalone_digit_run};
pub use mrz::{check_digit, find_td3, parse_td3, MrzChecks, MrzData};
pub use names::{clean_name, comma_name_line, label_adjacent_value, labeled_value, same_line_value};
pub use national_id::{extract_national_id, validate_national_id, NationalIdExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
