//! Registered address on the back of the national ID card.

const ADDRESS_LABEL: &str = "住址";

// Lines carrying these labels belong to other back-side fields
const OTHER_LABELS: &[&str] = &["父", "母", "配偶", "役別", "出生地"];

/// Join every line that looks like part of an address.
///
/// Addresses often wrap onto a second line, so all lines containing an
/// administrative unit are concatenated in reading order. The 住址 label is
/// dropped and spaces are removed.
pub fn join_address_lines(lines: &[&str], units: &[String]) -> Option<String> {
    let joined: String = lines
        .iter()
        .filter(|line| !OTHER_LABELS.iter().any(|label| line.contains(label)))
        .filter(|line| units.iter().any(|unit| !unit.is_empty() && line.contains(unit.as_str())))
        .map(|line| {
            line.replace(ADDRESS_LABEL, "")
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ':' && *c != '：')
                .collect::<String>()
        })
        .collect();

    if joined.is_empty() { None } else { Some(joined) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn units() -> Vec<String> {
        ["縣", "市", "區", "鄉", "鎮", "村", "里", "鄰", "路", "街", "段", "巷", "弄", "號"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_joins_wrapped_address() {
        let lines = [
            "父 陳大明 母 林美麗",
            "配偶",
            "住址：臺北市大安區",
            "和平里 5 鄰信義路三段 100 號",
        ];
        assert_eq!(
            join_address_lines(&lines, &units()),
            Some("臺北市大安區和平里5鄰信義路三段100號".to_string())
        );
    }

    #[test]
    fn test_skips_birthplace_line() {
        let lines = ["出生地 臺灣省臺北市", "住址 高雄市前鎮區"];
        assert_eq!(
            join_address_lines(&lines, &units()),
            Some("高雄市前鎮區".to_string())
        );
    }

    #[test]
    fn test_no_address() {
        let lines = ["役別 常備役", "配偶 王小華"];
        assert_eq!(join_address_lines(&lines, &units()), None);
    }
}
