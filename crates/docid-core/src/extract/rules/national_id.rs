//! Taiwanese national ID number extraction and validation.

use super::patterns::{NATIONAL_ID, NATIONAL_ID_TOLERANT};
use super::{ExtractionMatch, FieldExtractor};
use crate::text::confusable_digit;

/// National ID field extractor.
///
/// Input is expected in the compact (stripped, uppercased) form.
pub struct NationalIdExtractor {
    tolerant: bool,
}

impl NationalIdExtractor {
    /// Create a new extractor that only accepts exact matches.
    pub fn new() -> Self {
        Self { tolerant: false }
    }

    /// Also accept matches with O/I/L read in place of digits.
    pub fn with_tolerance(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }
}

impl Default for NationalIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NationalIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = NATIONAL_ID
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), 0.95, m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect();

        if self.tolerant {
            for m in NATIONAL_ID_TOLERANT.find_iter(text) {
                let raw = m.as_str();
                // Require most of the tail to be real digits
                if raw.chars().skip(1).filter(|c| c.is_ascii_digit()).count() < 6 {
                    continue;
                }

                let mut chars = raw.chars();
                let corrected: String = chars
                    .next()
                    .into_iter()
                    .chain(chars.map(confusable_digit))
                    .collect();

                if results.iter().any(|r| r.value == corrected) {
                    continue;
                }
                results.push(
                    ExtractionMatch::new(corrected, 0.7, raw).with_position(m.start(), m.end()),
                );
            }
        }

        results
    }
}

/// Extract the first exact national ID from compact text.
pub fn extract_national_id(text: &str) -> Option<String> {
    NationalIdExtractor::new().extract(text).map(|m| m.value)
}

/// Validate a national ID checksum.
///
/// The letter maps to a two-digit area code; the code digits and the nine
/// remaining digits are weighted 1, 9, 8, 7, 6, 5, 4, 3, 2, 1, 1 and the sum
/// must be divisible by 10.
pub fn validate_national_id(id: &str) -> bool {
    let mut chars = id.chars();
    let Some(code) = chars.next().and_then(area_code) else {
        return false;
    };

    let digits: Vec<u32> = chars.filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 9 || id.chars().count() != 10 || !matches!(digits[0], 1 | 2) {
        return false;
    }

    let weights = [9, 8, 7, 6, 5, 4, 3, 2, 1, 1];
    let sum: u32 = code / 10
        + [code % 10]
            .iter()
            .chain(digits.iter())
            .zip(weights.iter())
            .map(|(d, w)| d * w)
            .sum::<u32>();

    sum % 10 == 0
}

fn area_code(letter: char) -> Option<u32> {
    let code = match letter {
        'A' => 10,
        'B' => 11,
        'C' => 12,
        'D' => 13,
        'E' => 14,
        'F' => 15,
        'G' => 16,
        'H' => 17,
        'I' => 34,
        'J' => 18,
        'K' => 19,
        'L' => 20,
        'M' => 21,
        'N' => 22,
        'O' => 35,
        'P' => 23,
        'Q' => 24,
        'R' => 25,
        'S' => 26,
        'T' => 27,
        'U' => 28,
        'V' => 29,
        'W' => 32,
        'X' => 30,
        'Y' => 31,
        'Z' => 33,
        _ => return None,
    };
    Some(code)
}
