//! Republic-of-China calendar date extraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patterns::{MONTH_NAME_DATE, ROC_DATE};
use super::{ExtractionMatch, FieldExtractor};

/// Offset between ROC years and Gregorian years.
pub const ROC_YEAR_OFFSET: i32 = 1911;

/// A date in the ROC calendar as printed on Taiwanese documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RocDate {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

impl RocDate {
    pub fn new(year: u32, month: u32, day: u32) -> Option<Self> {
        if year == 0 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// `yyymmdd` integer ordering dates chronologically.
    pub fn sort_key(&self) -> u32 {
        self.year * 10_000 + self.month * 100 + self.day
    }

    /// `民國65年3月10日`.
    pub fn to_chinese(&self) -> String {
        format!("民國{}年{}月{}日", self.year, self.month, self.day)
    }

    /// Gregorian date, if the day exists.
    pub fn to_gregorian(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year as i32 + ROC_YEAR_OFFSET, self.month, self.day)
    }
}

impl std::fmt::Display for RocDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// ROC date field extractor.
pub struct RocDateExtractor;

impl RocDateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RocDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for RocDateExtractor {
    type Output = ExtractionMatch<RocDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in ROC_DATE.captures_iter(text) {
            let Some(full_match) = caps.get(0) else {
                continue;
            };

            // Reject pieces of longer digit runs such as 2025-01-15
            let before = text[..full_match.start()].chars().next_back();
            let after = text[full_match.end()..].chars().next();
            if before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit()) {
                continue;
            }

            let year: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);

            if let Some(date) = RocDate::new(year, month, day) {
                let confidence = if full_match.as_str().starts_with("民國") {
                    0.95
                } else {
                    0.8
                };
                results.push(
                    ExtractionMatch::new(date, confidence, full_match.as_str().trim())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// The earliest date in the text.
///
/// Documents carry no label telling the birth date from the issue date, but
/// a holder is always born before the card is issued, so the smallest date
/// is taken as the birth date.
pub fn earliest_roc_date(text: &str) -> Option<ExtractionMatch<RocDate>> {
    RocDateExtractor::new()
        .extract_all(text)
        .into_iter()
        .min_by_key(|m| m.value.sort_key())
}

/// The latest date in the text, if more than one date is present.
pub fn latest_roc_date(text: &str) -> Option<ExtractionMatch<RocDate>> {
    let all = RocDateExtractor::new().extract_all(text);
    if all.len() < 2 {
        return None;
    }
    all.into_iter().max_by_key(|m| m.value.sort_key())
}

/// Gregorian dates written as `10 MAR 1976`, in order of appearance.
///
/// Passport visual zones print dates this way; the input is matched
/// against its ASCII-uppercased form.
pub fn month_name_dates(text: &str) -> Vec<NaiveDate> {
    let upper = text.to_ascii_uppercase();
    MONTH_NAME_DATE
        .captures_iter(&upper)
        .filter_map(|caps| {
            let day: u32 = caps[1].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            let month = match &caps[2] {
                "JAN" => 1,
                "FEB" => 2,
                "MAR" => 3,
                "APR" => 4,
                "MAY" => 5,
                "JUN" => 6,
                "JUL" => 7,
                "AUG" => 8,
                "SEP" => 9,
                "OCT" => 10,
                "NOV" => 11,
                "DEC" => 12,
                _ => return None,
            };
            NaiveDate::from_ymd_opt(year, month, day)
        })
        .collect()
}
