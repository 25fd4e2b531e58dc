//! OCR text cleanup for keyword and pattern matching.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::config::NormalizeConfig;

use super::script::{ScriptConverter, TraditionalConverter};

lazy_static! {
    // `<` (MRZ filler) and `/` (date separator) are kept on purpose.
    static ref STRIP_RUNS: Regex = Regex::new(
        r#"[\s\.\-_,:;'"·•、，。：；＿－]+"#
    ).unwrap();
}

/// Two views of one normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedText {
    /// Stripped, uppercased, traditional. Used for keyword matching.
    pub compact: String,

    /// `compact` after confusable substitution. Used for digit patterns.
    pub numeric: String,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.compact.is_empty()
    }
}

/// Text normalizer.
pub struct Normalizer {
    converter: Option<Box<dyn ScriptConverter>>,
}

impl Normalizer {
    /// Normalizer with the built-in traditional-Chinese table.
    pub fn new() -> Self {
        Self {
            converter: Some(Box::new(TraditionalConverter::new())),
        }
    }

    /// Normalizer that leaves the script untouched.
    pub fn without_conversion() -> Self {
        Self { converter: None }
    }

    /// Use a custom script converter.
    pub fn with_converter(mut self, converter: Box<dyn ScriptConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn from_config(config: &NormalizeConfig) -> Self {
        if config.to_traditional {
            Self::new()
        } else {
            Self::without_conversion()
        }
    }

    /// Compact view: script conversion, separator stripping, uppercase.
    pub fn compact(&self, text: &str) -> String {
        let converted = match self.converter {
            Some(ref converter) => converter.to_traditional(text),
            None => text.to_string(),
        };
        STRIP_RUNS.replace_all(&converted, "").to_uppercase()
    }

    /// Produce both views of `text`.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let compact = self.compact(text);
        let numeric = substitute_confusables(&compact);
        NormalizedText { compact, numeric }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace letters OCR commonly reads in place of digits.
pub fn substitute_confusables(text: &str) -> String {
    text.chars().map(confusable_digit).collect()
}

/// Digit a confusable letter stands for, or the character itself.
pub fn confusable_digit(c: char) -> char {
    match c {
        'O' => '0',
        'I' | 'L' => '1',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compact_strips_and_uppercases() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.compact("Given  names:\n Lin-Mei_hua."), "GIVENNAMESLINMEIHUA");
        assert_eq!(normalizer.compact("身份证 号码"), "身份證號碼");
    }

    #[test]
    fn test_keeps_mrz_filler_and_date_separator() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.compact("P<TWN LIN<<MEI"), "P<TWNLIN<<MEI");
        assert_eq!(normalizer.compact("65/03/10"), "65/03/10");
    }

    #[test]
    fn test_numeric_view_substitutes_confusables() {
        let normalized = Normalizer::new().normalize("a1234567o9 il");
        assert_eq!(normalized.compact, "A1234567O9IL");
        assert_eq!(normalized.numeric, "A12345670911");
    }

    #[test]
    fn test_empty_input() {
        let normalized = Normalizer::new().normalize("");
        assert!(normalized.is_empty());
        assert_eq!(normalized.numeric, "");
    }

    #[test]
    fn test_idempotent() {
        let normalizer = Normalizer::new();
        for raw in [
            "姓名 陳小明\n身分证 A123456789",
            "P<TWNLIN<<MEI<HUA<<<<\n1234567890TWN",
            "  Sample, text: with; punctuation… ",
            "",
        ] {
            let once = normalizer.normalize(raw);
            let twice = normalizer.normalize(&once.compact);
            assert_eq!(twice.compact, once.compact);

            let numeric_twice = normalizer.normalize(&once.numeric);
            assert_eq!(numeric_twice.numeric, once.numeric);
        }
    }

    #[test]
    fn test_without_conversion() {
        let normalizer = Normalizer::without_conversion();
        assert_eq!(normalizer.compact("护照"), "护照");
    }
}
