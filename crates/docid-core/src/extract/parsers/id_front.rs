//! National ID card, front side.

use tracing::{debug, warn};

use crate::extract::rules::patterns::SEX;
use crate::extract::rules::{latest_roc_date, labeled_value, FieldExtractor, RocDateExtractor};
use crate::extract::{DocumentParser, ParseInput};
use crate::models::document::{ExtractedFields, ParserKind};
use crate::ocr::{ImageFilter, Rescan};

use super::{fill_birth_date, fill_national_id};

const NAME_LABELS: &[&str] = &["姓名", "Name"];
const ISSUE_LABELS: &[&str] = &["發證", "换发", "換發", "補發", "初發"];

pub struct IdCardFrontParser;

impl DocumentParser for IdCardFrontParser {
    fn kind(&self) -> ParserKind {
        ParserKind::IdCardFront
    }

    fn field_names(&self) -> &'static [&'static str] {
        &["name", "id_no", "dob", "dob_iso", "issue_date", "sex"]
    }

    fn parse(&self, input: &ParseInput<'_>, rescan: Option<&dyn Rescan>) -> ExtractedFields {
        let mut fields = ExtractedFields::new(self.kind(), input.label);
        let texts = input.texts();
        let raw = input.raw_text();
        let watermarks = &input.config.watermarks;

        let first_pass = labeled_value(&texts, NAME_LABELS, watermarks);
        let second_pass = match rescan {
            Some(rescan) if input.ocr.enable_rescan => {
                let filter = ImageFilter::RedChannelGamma {
                    gamma: input.ocr.rescan_gamma,
                };
                match rescan.rescan(filter) {
                    Ok(lines) => labeled_value(&lines.texts(), NAME_LABELS, watermarks),
                    Err(e) => {
                        warn!("Rescan failed: {}", e);
                        fields.warn(format!("rescan failed: {}", e));
                        None
                    }
                }
            }
            _ => None,
        };
        debug!("name first pass {:?}, second pass {:?}", first_pass, second_pass);
        fields.set_opt("name", second_pass.or(first_pass));

        fill_national_id(input, &mut fields);
        fill_birth_date(&raw, &mut fields);

        let labeled_issue = texts
            .iter()
            .filter(|line| ISSUE_LABELS.iter().any(|label| line.contains(label)))
            .find_map(|line| RocDateExtractor::new().extract(line));
        let issue = labeled_issue.or_else(|| latest_roc_date(&raw));
        fields.set_opt("issue_date", issue.map(|m| m.value.to_chinese()));

        let sex = SEX
            .captures(&raw)
            .map(|caps| caps[1].to_string())
            .or_else(|| sex_from_id(fields.get("id_no")));
        fields.set_opt("sex", sex);

        fields
    }
}

// Second character of the national ID: 1 male, 2 female
fn sex_from_id(id: &str) -> Option<String> {
    match id.chars().nth(1) {
        Some('1') => Some("男".to_string()),
        Some('2') => Some("女".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::extract::parse_text;
    use crate::ocr::OcrLineSet;
    use pretty_assertions::assert_eq;

    const FRONT: &str = "中華民國國民身分證\n姓名 陳小明\n身分證 A123456789\n民國65年03月10日出生\n民國108年05月01日換發";

    struct FixedRescan(Option<&'static str>);

    impl Rescan for FixedRescan {
        fn rescan(&self, filter: ImageFilter) -> Result<OcrLineSet, OcrError> {
            assert_eq!(filter, ImageFilter::RedChannelGamma { gamma: 0.6 });
            match self.0 {
                Some(text) => Ok(OcrLineSet::from_text(text)),
                None => Err(OcrError::Recognition("engine busy".to_string())),
            }
        }
    }

    #[test]
    fn test_front_fields() {
        let fields = parse_text(&IdCardFrontParser, FRONT, None);
        assert_eq!(fields.get("name"), "陳小明");
        assert_eq!(fields.get("id_no"), "A123456789");
        assert_eq!(fields.get("dob"), "民國65年3月10日");
        assert_eq!(fields.get("dob_iso"), "1976-03-10");
        assert_eq!(fields.get("issue_date"), "民國108年5月1日");
        assert_eq!(fields.get("sex"), "男");
        assert!(fields.warnings.is_empty());
    }

    #[test]
    fn test_rescan_name_preferred() {
        let rescan = FixedRescan(Some("姓名 陳曉明"));
        let fields = parse_text(&IdCardFrontParser, FRONT, Some(&rescan));
        assert_eq!(fields.get("name"), "陳曉明");
    }

    #[test]
    fn test_rescan_without_name_keeps_first_pass() {
        let rescan = FixedRescan(Some("雜訊"));
        let fields = parse_text(&IdCardFrontParser, FRONT, Some(&rescan));
        assert_eq!(fields.get("name"), "陳小明");
    }

    #[test]
    fn test_rescan_failure_is_warning() {
        let rescan = FixedRescan(None);
        let fields = parse_text(&IdCardFrontParser, FRONT, Some(&rescan));
        assert_eq!(fields.get("name"), "陳小明");
        assert_eq!(fields.warnings.len(), 1);
        assert!(fields.warnings[0].contains("rescan failed"));
    }

    #[test]
    fn test_bad_checksum_kept_with_warning() {
        let fields = parse_text(&IdCardFrontParser, "姓名 王大同\nA123456788", None);
        assert_eq!(fields.get("id_no"), "A123456788");
        assert!(fields.warnings.iter().any(|w| w.contains("checksum")));
    }

    #[test]
    fn test_printed_sex_wins() {
        let fields = parse_text(&IdCardFrontParser, "性別 女\nA123456789", None);
        assert_eq!(fields.get("sex"), "女");
    }

    #[test]
    fn test_short_id_not_extracted() {
        let fields = parse_text(&IdCardFrontParser, "姓名 陳小明\nA12345678", None);
        assert_eq!(fields.get("id_no"), "");
        assert_eq!(fields.get("sex"), "");
    }

    #[test]
    fn test_id_split_over_two_lines() {
        let fields = parse_text(&IdCardFrontParser, "姓名 陳小明\nA12345\n6789", None);
        assert_eq!(fields.get("id_no"), "A123456789");
        assert_eq!(fields.get("sex"), "男");

        // a joined number must pass its checksum
        let fields = parse_text(&IdCardFrontParser, "姓名 陳小明\nA12345\n6788", None);
        assert_eq!(fields.get("id_no"), "");
        assert!(fields.warnings.is_empty());
    }
}
