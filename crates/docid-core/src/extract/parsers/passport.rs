//! Passport data page.
//!
//! The machine-readable zone is authoritative when present. Fields it does
//! not yield are taken from the visual zone.

use tracing::{debug, warn};

use crate::extract::rules::patterns::{NATIONAL_ID, SEX};
use crate::extract::rules::{
    comma_name_line, find_td3, label_adjacent_value, month_name_dates, parse_td3,
    standalone_digit_run,
};
use crate::extract::{DocumentParser, ParseInput};
use crate::models::document::{ExtractedFields, ParserKind};
use crate::ocr::Rescan;

use super::fill_national_id;

const PASSPORT_NO_LEN: usize = 9;

pub struct PassportParser;

impl DocumentParser for PassportParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Passport
    }

    fn field_names(&self) -> &'static [&'static str] {
        &[
            "surname",
            "given_names",
            "eng_name",
            "passport_no",
            "nationality",
            "dob_iso",
            "sex",
            "expiry_iso",
            "id_no",
        ]
    }

    fn parse(&self, input: &ParseInput<'_>, _rescan: Option<&dyn Rescan>) -> ExtractedFields {
        let mut fields = ExtractedFields::new(self.kind(), input.label);
        for name in self.field_names() {
            fields.set(name, "");
        }

        let texts = input.texts();
        let config = input.config;

        if let Some(mrz) = find_td3(&texts).and_then(|(l1, l2)| parse_td3(&l1, &l2)) {
            debug!("MRZ found for passport {}", mrz.passport_no);
            fields.set("surname", &mrz.surname);
            fields.set("given_names", &mrz.given_names);
            fields.set("eng_name", mrz.full_name());
            fields.set("passport_no", &mrz.passport_no);
            fields.set("nationality", &mrz.nationality);
            fields.set("sex", &mrz.sex);
            fields.set_opt("dob_iso", mrz.birth_date.map(|d| d.format("%Y-%m-%d").to_string()));
            fields.set_opt("expiry_iso", mrz.expiry_date.map(|d| d.format("%Y-%m-%d").to_string()));
            if NATIONAL_ID.is_match(&mrz.personal_number) {
                fields.set("id_no", &mrz.personal_number);
            }

            if config.verify_mrz_checksums && !mrz.checks.all_valid() {
                let failed = mrz.checks.failures().join(", ");
                warn!("MRZ check digits failed: {}", failed);
                fields.warn(format!("MRZ check digit mismatch: {}", failed));
            }
        }

        if !fields.is_filled("eng_name") {
            fill_visual_name(&texts, &config.passport_blacklist, &mut fields);
        }

        if !fields.is_filled("passport_no") {
            let number = input
                .compact_lines()
                .iter()
                .find_map(|line| standalone_digit_run(line, PASSPORT_NO_LEN));
            fields.set_opt("passport_no", number);
        }

        if !fields.is_filled("dob_iso") || !fields.is_filled("expiry_iso") {
            let mut dates = month_name_dates(&input.raw_text());
            dates.sort();
            if !fields.is_filled("dob_iso") {
                if let Some(first) = dates.first() {
                    fields.set("dob_iso", first.format("%Y-%m-%d").to_string());
                }
            }
            if !fields.is_filled("expiry_iso") && dates.len() >= 2 {
                if let Some(last) = dates.last() {
                    fields.set("expiry_iso", last.format("%Y-%m-%d").to_string());
                }
            }
        }

        if !fields.is_filled("sex") {
            let sex = SEX.captures(&input.raw_text()).map(|caps| match &caps[1] {
                "男" => "M".to_string(),
                _ => "F".to_string(),
            });
            fields.set_opt("sex", sex);
        }

        if !fields.is_filled("id_no") {
            fill_national_id(input, &mut fields);
        }

        fields
    }
}

fn fill_visual_name(texts: &[&str], blacklist: &[String], fields: &mut ExtractedFields) {
    if let Some(line) = comma_name_line(texts, blacklist) {
        let (surname, given) = line.split_once(',').unwrap_or((line.as_str(), ""));
        fields.set("surname", surname);
        fields.set("given_names", given);
        fields.set("eng_name", &line);
        return;
    }

    let surname = label_adjacent_value(texts, "Surname", blacklist);
    let given = label_adjacent_value(texts, "Given name", blacklist);
    let eng_name = match (&surname, &given) {
        (Some(s), Some(g)) => Some(format!("{}, {}", s, g)),
        (Some(s), None) => Some(s.clone()),
        (None, Some(g)) => Some(g.clone()),
        (None, None) => None,
    };
    fields.set_opt("surname", surname);
    fields.set_opt("given_names", given);
    fields.set_opt("eng_name", eng_name);
}
