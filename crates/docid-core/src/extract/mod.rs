//! Field extraction: one parser per document kind.

pub mod parsers;
pub mod rules;

pub use parsers::{
    HealthCardParser, IdCardBackParser, IdCardFrontParser, PassportParser, TransitCardParser,
};

use crate::models::config::{ExtractionConfig, OcrConfig};
use crate::models::document::{ExtractedFields, ParserKind};
use crate::ocr::{OcrLineSet, Rescan};
use crate::text::{substitute_confusables, NormalizedText, Normalizer};

/// Everything a parser may read.
pub struct ParseInput<'a> {
    /// Document type label of the matched rule.
    pub label: &'a str,
    /// Whole-text normalized views.
    pub normalized: &'a NormalizedText,
    /// Recognized lines in reading order.
    pub lines: &'a OcrLineSet,
    pub normalizer: &'a Normalizer,
    pub config: &'a ExtractionConfig,
    pub ocr: &'a OcrConfig,
}

impl ParseInput<'_> {
    pub fn texts(&self) -> Vec<&str> {
        self.lines.texts()
    }

    pub fn raw_text(&self) -> String {
        self.lines.text()
    }

    /// Compact view of each line.
    pub fn compact_lines(&self) -> Vec<String> {
        self.lines
            .lines
            .iter()
            .map(|l| self.normalizer.compact(&l.text))
            .collect()
    }

    /// Numeric view of each line.
    pub fn numeric_lines(&self) -> Vec<String> {
        self.compact_lines()
            .iter()
            .map(|l| substitute_confusables(l))
            .collect()
    }
}

/// Turns recognized text into named fields for one document kind.
///
/// Parsing is best effort: a field that cannot be found is left empty and
/// never fails the whole document.
pub trait DocumentParser {
    fn kind(&self) -> ParserKind;

    /// Fields this parser always fills (possibly with empty strings).
    fn field_names(&self) -> &'static [&'static str];

    /// Extract fields, optionally asking for a second OCR pass.
    fn parse(&self, input: &ParseInput<'_>, rescan: Option<&dyn Rescan>) -> ExtractedFields;
}

impl ParserKind {
    /// The parser implementing this kind.
    pub fn parser(&self) -> &'static dyn DocumentParser {
        match self {
            ParserKind::IdCardFront => &IdCardFrontParser,
            ParserKind::IdCardBack => &IdCardBackParser,
            ParserKind::Passport => &PassportParser,
            ParserKind::HealthCard => &HealthCardParser,
            ParserKind::TransitCard => &TransitCardParser,
        }
    }
}

/// Run a parser over plain text with default configuration.
#[cfg(test)]
pub(crate) fn parse_text(
    parser: &dyn DocumentParser,
    text: &str,
    rescan: Option<&dyn Rescan>,
) -> ExtractedFields {
    let normalizer = Normalizer::new();
    let lines = OcrLineSet::from_text(text);
    let normalized = normalizer.normalize(&lines.text());
    let config = ExtractionConfig::default();
    let ocr = OcrConfig::default();
    let input = ParseInput {
        label: "test",
        normalized: &normalized,
        lines: &lines,
        normalizer: &normalizer,
        config: &config,
        ocr: &ocr,
    };
    parser.parse(&input, rescan)
}
