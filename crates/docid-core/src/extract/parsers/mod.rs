//! Per-document parsers.

mod health_card;
mod id_back;
mod id_front;
mod passport;
mod transit;

pub use health_card::HealthCardParser;
pub use id_back::IdCardBackParser;
pub use id_front::IdCardFrontParser;
pub use passport::PassportParser;
pub use transit::{parse_transit_line, TransitCardParser};

use tracing::debug;

use crate::extract::ParseInput;
use crate::models::document::ExtractedFields;

use super::rules::{earliest_roc_date, validate_national_id, FieldExtractor, NationalIdExtractor};

/// Fill `id_no` from the first line holding a national ID.
///
/// A checksum mismatch keeps the value and records a warning. When no line
/// holds one, the whole compact text is searched for a number OCR split
/// over two boxes, accepted only with a valid checksum.
fn fill_national_id(input: &ParseInput<'_>, fields: &mut ExtractedFields) {
    let extractor = NationalIdExtractor::new().with_tolerance(true);
    let found = input
        .compact_lines()
        .iter()
        .find_map(|line| extractor.extract(line));

    if let Some(m) = found {
        debug!("national ID {} (confidence {})", m.value, m.confidence);
        if !validate_national_id(&m.value) {
            fields.warn(format!("national ID {} fails checksum", m.value));
        }
        fields.set("id_no", &m.value);
        return;
    }

    let joined = NationalIdExtractor::new()
        .extract_all(&input.normalized.compact)
        .into_iter()
        .map(|m| m.value)
        .find(|id| validate_national_id(id));
    if let Some(ref id) = joined {
        debug!("national ID {} joined across lines", id);
    }
    fields.set_opt("id_no", joined);
}

/// Fill `dob` and `dob_iso` from the earliest ROC date in `text`.
fn fill_birth_date(text: &str, fields: &mut ExtractedFields) {
    let dob = earliest_roc_date(text);
    fields.set_opt("dob", dob.as_ref().map(|m| m.value.to_chinese()));
    fields.set_opt(
        "dob_iso",
        dob.and_then(|m| m.value.to_gregorian())
            .map(|d| d.format("%Y-%m-%d").to_string()),
    );
}
