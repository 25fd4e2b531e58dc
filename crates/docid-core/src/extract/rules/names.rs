//! Name extraction next to printed labels.

use super::patterns::LATIN_NAME_LINE;

/// Strip watermark text, label punctuation and, for Chinese names, the
/// spaces OCR inserts between characters.
pub fn clean_name(value: &str, watermarks: &[String]) -> String {
    let mut cleaned = value.to_string();
    for mark in watermarks.iter().filter(|m| !m.is_empty()) {
        cleaned = cleaned.replace(mark.as_str(), "");
    }

    let cleaned = cleaned
        .trim()
        .trim_matches(|c: char| c == ':' || c == '：' || c.is_whitespace());

    if cleaned.chars().any(is_han) {
        cleaned.chars().filter(|c| !c.is_whitespace()).collect()
    } else {
        cleaned.to_string()
    }
}

/// Value printed after a label.
///
/// Takes the remainder of the label's line when it holds at least two
/// characters, otherwise the following line. Latin labels match ignoring
/// ASCII case.
pub fn labeled_value(lines: &[&str], labels: &[&str], watermarks: &[String]) -> Option<String> {
    for (i, line) in lines.iter().enumerate() {
        let upper = line.to_ascii_uppercase();
        let Some((pos, label)) = labels
            .iter()
            .find_map(|label| upper.find(&label.to_ascii_uppercase()).map(|p| (p, label)))
        else {
            continue;
        };

        let rest = clean_name(&line[pos + label.len()..], watermarks);
        if rest.chars().count() >= 2 {
            return Some(rest);
        }

        if let Some(next) = lines.get(i + 1) {
            let next = clean_name(next, watermarks);
            if !next.is_empty() {
                return Some(next);
            }
        }
        return None;
    }
    None
}

/// Remainder of the first line carrying one of `labels`, without looking at
/// the following line. Used for fields that may legitimately be blank.
pub fn same_line_value(lines: &[&str], labels: &[&str], watermarks: &[String]) -> Option<String> {
    lines.iter().find_map(|line| {
        let (pos, label) = labels
            .iter()
            .find_map(|label| line.find(label).map(|p| (p, label)))?;
        let rest = clean_name(&line[pos + label.len()..], watermarks);
        (!rest.is_empty()).then_some(rest)
    })
}

/// First `SURNAME, GIVEN` line that is not official boilerplate.
pub fn comma_name_line(lines: &[&str], blacklist: &[String]) -> Option<String> {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| l.contains(',') && l.chars().any(|c| c.is_ascii_uppercase()))
        .filter(|l| !is_blacklisted(l, blacklist))
        .find(|l| {
            let letters = l.chars().filter(|c| c.is_alphabetic()).count();
            let latin = l.chars().filter(|c| c.is_ascii_alphabetic()).count();
            letters > 0 && latin * 2 >= letters
        })
        .map(str::to_string)
}

/// First all-capitals Latin line within two lines after `label`.
pub fn label_adjacent_value(lines: &[&str], label: &str, blacklist: &[String]) -> Option<String> {
    let label = label.to_ascii_uppercase();
    let start = lines
        .iter()
        .position(|l| l.to_ascii_uppercase().contains(&label))?;

    lines
        .iter()
        .skip(start + 1)
        .take(2)
        .map(|l| l.trim())
        .find(|l| LATIN_NAME_LINE.is_match(l) && !is_blacklisted(l, blacklist))
        .map(str::to_string)
}

fn is_blacklisted(line: &str, blacklist: &[String]) -> bool {
    let upper = line.to_uppercase();
    blacklist
        .iter()
        .any(|token| upper.contains(&token.to_uppercase()))
}

fn is_han(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn marks() -> Vec<String> {
        vec!["樣本".to_string(), "SAMPLE".to_string()]
    }

    fn blacklist() -> Vec<String> {
        ["MINISTRY", "REPUBLIC", "SURNAME", "GIVEN"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_name_on_label_line() {
        let lines = ["中華民國國民身分證", "姓名 陳小明", "出生"];
        assert_eq!(labeled_value(&lines, &["姓名"], &marks()), Some("陳小明".to_string()));
    }

    #[test]
    fn test_name_on_next_line() {
        let lines = ["姓名：", "陳 小 明", "出生"];
        assert_eq!(labeled_value(&lines, &["姓名"], &marks()), Some("陳小明".to_string()));
    }

    #[test]
    fn test_strips_watermark() {
        let lines = ["姓名 陳樣本小明"];
        assert_eq!(labeled_value(&lines, &["姓名"], &marks()), Some("陳小明".to_string()));
    }

    #[test]
    fn test_latin_label_ignores_case() {
        let lines = ["name: LIN MEI-HUA SAMPLE"];
        assert_eq!(
            labeled_value(&lines, &["NAME"], &marks()),
            Some("LIN MEI-HUA".to_string())
        );
    }

    #[test]
    fn test_missing_label() {
        let lines = ["出生 民國65年03月10日"];
        assert_eq!(labeled_value(&lines, &["姓名"], &marks()), None);
    }

    #[test]
    fn test_same_line_value_ignores_next_line() {
        let lines = ["配偶", "住址 臺北市大安區", "役別 常備役"];
        assert_eq!(same_line_value(&lines, &["配偶"], &marks()), None);
        assert_eq!(
            same_line_value(&lines, &["役別"], &marks()),
            Some("常備役".to_string())
        );
    }

    #[test]
    fn test_comma_line_skips_labels() {
        let lines = ["REPUBLIC OF CHINA, TAIWAN", "Surname", "Given names", "LIN, MEI-HUA"];
        assert_eq!(
            comma_name_line(&lines, &blacklist()),
            Some("LIN, MEI-HUA".to_string())
        );
    }

    #[test]
    fn test_label_adjacent() {
        let lines = ["姓 Surname", "LIN", "名 Given names", "MEI-HUA"];
        assert_eq!(
            label_adjacent_value(&lines, "Surname", &blacklist()),
            Some("LIN".to_string())
        );
        assert_eq!(
            label_adjacent_value(&lines, "Given names", &blacklist()),
            Some("MEI-HUA".to_string())
        );
    }
}
