//! National health-insurance card.

use crate::extract::rules::{clean_name, exact_digit_run, labeled_value};
use crate::extract::{DocumentParser, ParseInput};
use crate::models::document::{ExtractedFields, ParserKind};
use crate::ocr::Rescan;

use super::{fill_birth_date, fill_national_id};

const CARD_NO_LEN: usize = 12;

// Printed headings that can look like a short Chinese name
const HEADINGS: &[&str] = &["全民健康保險", "健保", "保險", "卡", "衛生福利部", "中央"];

pub struct HealthCardParser;

impl DocumentParser for HealthCardParser {
    fn kind(&self) -> ParserKind {
        ParserKind::HealthCard
    }

    fn field_names(&self) -> &'static [&'static str] {
        &["name", "id_no", "dob", "dob_iso", "card_no"]
    }

    fn parse(&self, input: &ParseInput<'_>, _rescan: Option<&dyn Rescan>) -> ExtractedFields {
        let mut fields = ExtractedFields::new(self.kind(), input.label);
        let texts = input.texts();
        let watermarks = &input.config.watermarks;

        // The card prints the name without a label
        let name = labeled_value(&texts, &["姓名", "Name"], watermarks).or_else(|| {
            texts
                .iter()
                .map(|line| clean_name(line, watermarks))
                .find(|line| is_bare_name(line))
        });
        fields.set_opt("name", name);

        fill_national_id(input, &mut fields);
        fill_birth_date(&input.raw_text(), &mut fields);

        let card_no = input
            .numeric_lines()
            .iter()
            .find_map(|line| exact_digit_run(line, CARD_NO_LEN));
        fields.set_opt("card_no", card_no);

        fields
    }
}

fn is_bare_name(line: &str) -> bool {
    let count = line.chars().count();
    (2..=4).contains(&count)
        && line.chars().all(|c| matches!(c, '\u{4e00}'..='\u{9fff}'))
        && !HEADINGS.iter().any(|h| line.contains(h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse_text;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_health_card_fields() {
        let text = "全民健康保險\n陳小明\nA123456789\n065/03/10\n0000 1234 5678";
        let fields = parse_text(&HealthCardParser, text, None);

        assert_eq!(fields.get("name"), "陳小明");
        assert_eq!(fields.get("id_no"), "A123456789");
        assert_eq!(fields.get("dob"), "民國65年3月10日");
        assert_eq!(fields.get("dob_iso"), "1976-03-10");
        assert_eq!(fields.get("card_no"), "000012345678");
    }

    #[test]
    fn test_card_number_length_is_exact() {
        let eleven = parse_text(&HealthCardParser, "健保卡\n卡號 00001234567", None);
        assert_eq!(eleven.get("card_no"), "");

        let thirteen = parse_text(&HealthCardParser, "健保卡\n卡號 0000123456789", None);
        assert_eq!(thirteen.get("card_no"), "");

        let twelve = parse_text(&HealthCardParser, "健保卡\n卡號 000012345678", None);
        assert_eq!(twelve.get("card_no"), "000012345678");
    }

    #[test]
    fn test_card_number_with_confusables() {
        let fields = parse_text(&HealthCardParser, "卡號 OOOO1234567B", None);
        assert_eq!(fields.get("card_no"), "");

        let fields = parse_text(&HealthCardParser, "卡號 OOOO12345678", None);
        assert_eq!(fields.get("card_no"), "000012345678");
    }
}
