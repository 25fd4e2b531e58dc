//! National ID card, back side.

use crate::extract::rules::patterns::{FATHER, MOTHER};
use crate::extract::rules::{clean_name, join_address_lines, same_line_value};
use crate::extract::{DocumentParser, ParseInput};
use crate::models::document::{ExtractedFields, ParserKind};
use crate::ocr::Rescan;

pub struct IdCardBackParser;

impl DocumentParser for IdCardBackParser {
    fn kind(&self) -> ParserKind {
        ParserKind::IdCardBack
    }

    fn field_names(&self) -> &'static [&'static str] {
        &["address", "father", "mother", "spouse", "military_service", "birthplace"]
    }

    fn parse(&self, input: &ParseInput<'_>, _rescan: Option<&dyn Rescan>) -> ExtractedFields {
        let mut fields = ExtractedFields::new(self.kind(), input.label);
        let texts = input.texts();
        let config = input.config;

        fields.set_opt("address", join_address_lines(&texts, &config.address_units));

        let parent = |pattern: &regex::Regex| {
            texts
                .iter()
                .find_map(|line| pattern.captures(line).map(|caps| caps[1].to_string()))
                .map(|name| clean_name(&name, &config.watermarks))
                .filter(|name| !name.is_empty())
        };
        fields.set_opt("father", parent(&*FATHER));
        fields.set_opt("mother", parent(&*MOTHER));

        fields.set_opt("spouse", same_line_value(&texts, &["配偶"], &config.watermarks));
        fields.set_opt(
            "military_service",
            same_line_value(&texts, &["役別"], &config.watermarks),
        );
        fields.set_opt(
            "birthplace",
            same_line_value(&texts, &["出生地"], &config.watermarks),
        );

        fields
    }
}
