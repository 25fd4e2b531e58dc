//! Common regex patterns for identity-document extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // National ID: one letter, 1 or 2, eight digits
    pub static ref NATIONAL_ID: Regex = Regex::new(
        r"[A-Z][12][0-9]{8}"
    ).unwrap();

    // Same shape, tolerating letters OCR reads in place of digits
    pub static ref NATIONAL_ID_TOLERANT: Regex = Regex::new(
        r"[A-Z][12IL][0-9OIL]{8}"
    ).unwrap();

    // ROC calendar date: 民國65年03月10日, 65/03/10, 065.03.10
    pub static ref ROC_DATE: Regex = Regex::new(
        r"(?:民國\s*)?([0-9]{2,3})\s*[年/.\-]\s*([0-9]{1,2})\s*[月/.\-]\s*([0-9]{1,2})(?:\s*日)?"
    ).unwrap();

    // Gregorian date on transaction screenshots: 2025-01-15, 2025/01/15
    pub static ref WESTERN_DATE: Regex = Regex::new(
        r"([0-9]{4})[-/]([0-9]{2})[-/]([0-9]{2})"
    ).unwrap();

    pub static ref CLOCK_TIME: Regex = Regex::new(
        r"([0-9]{2}):([0-9]{2}):([0-9]{2})"
    ).unwrap();

    pub static ref SIGNED_INTEGER: Regex = Regex::new(
        r"-?[0-9]+"
    ).unwrap();

    pub static ref DIGIT_RUN: Regex = Regex::new(
        r"[0-9]+"
    ).unwrap();

    // Back-side family fields
    pub static ref FATHER: Regex = Regex::new(
        r"父[\s:：]*(\p{Han}+?)(?:[\s,，]|母|$)"
    ).unwrap();

    pub static ref MOTHER: Regex = Regex::new(
        r"母[\s:：]*(\p{Han}+)"
    ).unwrap();

    pub static ref SEX: Regex = Regex::new(
        r"性別[\s:：]*([男女])"
    ).unwrap();

    // Passport visual-zone date: 10 MAR 1976
    pub static ref MONTH_NAME_DATE: Regex = Regex::new(
        r"\b([0-9]{1,2})\s*(JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)\s*([0-9]{4})\b"
    ).unwrap();

    // A line of Latin capitals such as "LIN" or "MEI-HUA"
    pub static ref LATIN_NAME_LINE: Regex = Regex::new(
        r"^[A-Z][A-Z ,'\-]*[A-Z]$"
    ).unwrap();
}
