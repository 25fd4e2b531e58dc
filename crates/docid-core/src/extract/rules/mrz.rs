//! Passport machine-readable zone (ICAO 9303 TD3).

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Characters per TD3 line.
pub const TD3_LINE_LEN: usize = 44;

/// Outcome of the check-digit verification for each protected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MrzChecks {
    pub passport_no: bool,
    pub birth_date: bool,
    pub expiry_date: bool,
    pub personal_number: bool,
    pub composite: bool,
}

impl MrzChecks {
    pub fn all_valid(&self) -> bool {
        self.passport_no
            && self.birth_date
            && self.expiry_date
            && self.personal_number
            && self.composite
    }

    /// Names of the fields whose check digit did not match.
    pub fn failures(&self) -> Vec<&'static str> {
        [
            ("passport_no", self.passport_no),
            ("birth_date", self.birth_date),
            ("expiry_date", self.expiry_date),
            ("personal_number", self.personal_number),
            ("composite", self.composite),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| name)
        .collect()
    }
}

/// Fields decoded from a TD3 zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrzData {
    pub document_type: String,
    pub issuing_state: String,
    pub surname: String,
    pub given_names: String,
    pub passport_no: String,
    pub nationality: String,
    pub birth_date: Option<NaiveDate>,
    /// `M`, `F` or empty when unspecified.
    pub sex: String,
    pub expiry_date: Option<NaiveDate>,
    pub personal_number: String,
    pub checks: MrzChecks,
}

impl MrzData {
    /// `SURNAME, GIVEN NAMES`.
    pub fn full_name(&self) -> String {
        match (self.surname.is_empty(), self.given_names.is_empty()) {
            (false, false) => format!("{}, {}", self.surname, self.given_names),
            (false, true) => self.surname.clone(),
            (true, _) => self.given_names.clone(),
        }
    }
}

/// ICAO check digit: weights 7, 3, 1 repeating; `<` counts as 0, digits as
/// themselves and letters A-Z as 10-35.
pub fn check_digit(field: &str) -> Option<u32> {
    let mut sum = 0u32;
    for (i, c) in field.chars().enumerate() {
        let value = match c {
            '<' => 0,
            '0'..='9' => c as u32 - '0' as u32,
            'A'..='Z' => c as u32 - 'A' as u32 + 10,
            _ => return None,
        };
        sum += value * [7, 3, 1][i % 3];
    }
    Some(sum % 10)
}

/// Locate a TD3 zone among OCR lines.
///
/// Spaces are removed, short lines are padded with fillers and long lines
/// truncated so both come back exactly 44 characters long.
pub fn find_td3(lines: &[&str]) -> Option<(String, String)> {
    let cleaned: Vec<String> = lines.iter().map(|l| clean_mrz_line(l)).collect();

    cleaned.windows(2).find_map(|pair| {
        let (first, second) = (&pair[0], &pair[1]);
        let looks_like_first = first.starts_with('P') && first.contains("<<") && first.len() >= 30;
        let looks_like_second = second.len() >= 28
            && second.chars().filter(|c| c.is_ascii_digit()).count() >= 12;
        (looks_like_first && looks_like_second).then(|| (fit_td3(first), fit_td3(second)))
    })
}

/// Decode a TD3 zone. Returns `None` when the lines are not TD3-shaped.
pub fn parse_td3(line1: &str, line2: &str) -> Option<MrzData> {
    if line1.len() != TD3_LINE_LEN || line2.len() != TD3_LINE_LEN || !line1.is_ascii() || !line2.is_ascii() {
        return None;
    }
    if !line1.starts_with('P') {
        return None;
    }

    let (surname, given_names) = split_names(&line1[5..]);

    let passport_field = &line2[0..9];
    let birth_field = digits_only(&line2[13..19]);
    let expiry_field = digits_only(&line2[21..27]);
    let personal_field = &line2[28..42];

    let composite_source = format!(
        "{}{}{}{}{}{}",
        &line2[0..10],
        birth_field,
        &line2[19..20],
        expiry_field,
        &line2[27..28],
        &line2[28..43],
    );

    let checks = MrzChecks {
        passport_no: verify(passport_field, &line2[9..10]),
        birth_date: verify(&birth_field, &line2[19..20]),
        expiry_date: verify(&expiry_field, &line2[27..28]),
        personal_number: (personal_field.chars().all(|c| c == '<')
            && matches!(&line2[42..43], "<" | "0"))
            || verify(personal_field, &line2[42..43]),
        composite: verify(&composite_source, &line2[43..44]),
    };

    Some(MrzData {
        document_type: line1[0..2].trim_end_matches('<').to_string(),
        issuing_state: line1[2..5].trim_end_matches('<').to_string(),
        surname,
        given_names,
        passport_no: passport_field.trim_end_matches('<').to_string(),
        nationality: line2[10..13].trim_end_matches('<').to_string(),
        birth_date: mrz_date(&birth_field, false),
        sex: match &line2[20..21] {
            "M" => "M".to_string(),
            "F" => "F".to_string(),
            _ => String::new(),
        },
        expiry_date: mrz_date(&expiry_field, true),
        personal_number: personal_field.trim_end_matches('<').to_string(),
        checks,
    })
}

fn verify(field: &str, digit: &str) -> bool {
    let expected = match digit {
        "<" => Some(0),
        d => d.chars().next().and_then(|c| c.to_digit(10)),
    };
    expected.is_some() && check_digit(field) == expected
}

fn clean_mrz_line(line: &str) -> String {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '«' | '‹' | '＜' => '<',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

fn fit_td3(line: &str) -> String {
    let mut fitted: String = line.chars().take(TD3_LINE_LEN).collect();
    while fitted.len() < TD3_LINE_LEN {
        fitted.push('<');
    }
    fitted
}

// Numeric fields only: OCR reads O for 0 and I/L for 1
fn digits_only(field: &str) -> String {
    field.chars().map(crate::text::confusable_digit).collect()
}

fn split_names(field: &str) -> (String, String) {
    let field = field.trim_end_matches('<');
    let (surname, given) = field.split_once("<<").unwrap_or((field, ""));
    (filler_to_space(surname), filler_to_space(given))
}

fn filler_to_space(part: &str) -> String {
    part.split('<')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// Two-digit years: expiry dates are in this century, birth dates are not in
// the future.
fn mrz_date(field: &str, expiry: bool) -> Option<NaiveDate> {
    if field.len() != 6 || !field.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let yy: i32 = field[0..2].parse().ok()?;
    let month: u32 = field[2..4].parse().ok()?;
    let day: u32 = field[4..6].parse().ok()?;

    let year = if expiry || 2000 + yy <= Utc::now().year() {
        2000 + yy
    } else {
        1900 + yy
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LINE1: &str = "P<TWNLIN<<MEI<HUA<<<<<<<<<<<<<<<<<<<<<<<<<<<";
    const LINE2: &str = "3123456785TWN7603101F3001019A123456789<<<<70";

    #[test]
    fn test_check_digit() {
        assert_eq!(check_digit("L898902C3"), Some(6));
        assert_eq!(check_digit("740812"), Some(2));
        assert_eq!(check_digit("312345678"), Some(5));
        assert_eq!(check_digit("<<<<"), Some(0));
        assert_eq!(check_digit("ab"), None);
    }

    #[test]
    fn test_parse_td3() {
        assert_eq!(LINE1.len(), TD3_LINE_LEN);
        assert_eq!(LINE2.len(), TD3_LINE_LEN);

        let data = parse_td3(LINE1, LINE2).unwrap();
        assert_eq!(data.document_type, "P");
        assert_eq!(data.issuing_state, "TWN");
        assert_eq!(data.surname, "LIN");
        assert_eq!(data.given_names, "MEI HUA");
        assert_eq!(data.full_name(), "LIN, MEI HUA");
        assert_eq!(data.passport_no, "312345678");
        assert_eq!(data.nationality, "TWN");
        assert_eq!(data.birth_date, NaiveDate::from_ymd_opt(1976, 3, 10));
        assert_eq!(data.sex, "F");
        assert_eq!(data.expiry_date, NaiveDate::from_ymd_opt(2030, 1, 1));
        assert_eq!(data.personal_number, "A123456789");
        assert!(data.checks.all_valid(), "{:?}", data.checks.failures());
    }

    #[test]
    fn test_bad_check_digit_reported() {
        let tampered = LINE2.replacen("3123456785", "3123456784", 1);
        let data = parse_td3(LINE1, &tampered).unwrap();
        assert!(!data.checks.passport_no);
        assert!(data.checks.failures().contains(&"passport_no"));
        assert_eq!(data.passport_no, "312345678");
    }

    #[test]
    fn test_find_td3_among_lines() {
        let line1 = "P<TWN LIN<<MEI<HUA<<<<<<<<<<<<<<<<";
        let lines = ["REPUBLIC OF CHINA", "PASSPORT", line1, LINE2];
        let (first, second) = find_td3(&lines).unwrap();
        assert_eq!(first, LINE1);
        assert_eq!(second, LINE2);
    }

    #[test]
    fn test_rejects_non_td3() {
        assert!(parse_td3("P<TWN", LINE2).is_none());
        assert!(find_td3(&["姓名 陳小明", "A123456789"]).is_none());
    }
}
