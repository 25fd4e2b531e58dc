//! Transit card (EasyCard) transaction screenshots.

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::extract::rules::patterns::{CLOCK_TIME, SIGNED_INTEGER, WESTERN_DATE};
use crate::extract::{DocumentParser, ParseInput};
use crate::models::document::{ExtractedFields, ParserKind, TransitRecord, TransportMode};
use crate::ocr::Rescan;

const TOP_UP: &str = "加值";
const NOISE_WORDS: &[&str] = &["扣款", "交易", "連線"];

pub struct TransitCardParser;

impl DocumentParser for TransitCardParser {
    fn kind(&self) -> ParserKind {
        ParserKind::TransitCard
    }

    fn field_names(&self) -> &'static [&'static str] {
        &["record_count", "total_amount"]
    }

    fn parse(&self, input: &ParseInput<'_>, _rescan: Option<&dyn Rescan>) -> ExtractedFields {
        let mut fields = ExtractedFields::new(self.kind(), input.label);

        fields.records = input
            .texts()
            .into_iter()
            .filter_map(parse_transit_line)
            .collect();

        let total: u64 = fields.records.iter().map(|r| r.amount as u64).sum();
        debug!("{} transit records, total {}", fields.records.len(), total);

        fields.set("record_count", fields.records.len().to_string());
        fields.set("total_amount", total.to_string());
        fields
    }
}

/// Parse one transaction row.
///
/// A row needs a `yyyy-mm-dd` (or `yyyy/mm/dd`) date and an `hh:mm:ss`
/// time; the last integer left on the line is the fare. Top-ups are not
/// fares and yield `None`.
pub fn parse_transit_line(line: &str) -> Option<TransitRecord> {
    let line = line.trim();
    if line.contains(TOP_UP) {
        return None;
    }

    let date_caps = WESTERN_DATE.captures(line)?;
    let time_caps = CLOCK_TIME.captures(line)?;

    let date = NaiveDate::from_ymd_opt(
        date_caps[1].parse().ok()?,
        date_caps[2].parse().ok()?,
        date_caps[3].parse().ok()?,
    )?;
    let time = NaiveTime::from_hms_opt(
        time_caps[1].parse().ok()?,
        time_caps[2].parse().ok()?,
        time_caps[3].parse().ok()?,
    )?;

    let rest = line
        .replace(&date_caps[0], " ")
        .replace(&time_caps[0], " ");

    let amount_match = SIGNED_INTEGER.find_iter(&rest).last();
    let amount = amount_match
        .and_then(|m| m.as_str().trim_start_matches('-').parse::<u32>().ok())
        .unwrap_or(0);

    let mut location = match amount_match {
        Some(m) => format!("{}{}", &rest[..m.start()], &rest[m.end()..]),
        None => rest.clone(),
    };
    for word in NOISE_WORDS {
        location = location.replace(word, "");
    }
    let location = location.split_whitespace().collect::<Vec<_>>().join(" ");

    Some(TransitRecord {
        date,
        time,
        mode: transport_mode(&location),
        location,
        amount,
    })
}

fn transport_mode(location: &str) -> TransportMode {
    if location.contains("捷運") {
        TransportMode::Metro
    } else if location.contains("台鐵") || location.contains("臺鐵") {
        TransportMode::Rail
    } else if location.contains("客運") {
        TransportMode::Coach
    } else if location.contains("高鐵") {
        TransportMode::HighSpeedRail
    } else if location.contains("計程車") {
        TransportMode::Taxi
    } else if location.contains('路') || location.contains('車') {
        TransportMode::Bus
    } else {
        TransportMode::Metro
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse_text;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_metro_row() {
        let record = parse_transit_line("2025-01-15 08:30:12 捷運台北車站 扣款 -25").unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(record.time, NaiveTime::from_hms_opt(8, 30, 12).unwrap());
        assert_eq!(record.amount, 25);
        assert_eq!(record.location, "捷運台北車站");
        assert_eq!(record.mode, TransportMode::Metro);
        assert_eq!(record.short_date(), "01/15");
    }

    #[test]
    fn test_transport_modes() {
        let mode = |line: &str| parse_transit_line(line).unwrap().mode;
        assert_eq!(mode("2025/01/15 09:00:00 台鐵松山 -32"), TransportMode::Rail);
        assert_eq!(mode("2025/01/15 09:00:00 國光客運 -120"), TransportMode::Coach);
        assert_eq!(mode("2025/01/15 09:00:00 高鐵左營 -1490"), TransportMode::HighSpeedRail);
        assert_eq!(mode("2025/01/15 09:00:00 307路 -15"), TransportMode::Bus);
        assert_eq!(mode("2025/01/15 09:00:00 南京復興 -20"), TransportMode::Metro);
    }

    #[test]
    fn test_skips_top_up_and_noise() {
        assert!(parse_transit_line("2025-01-15 08:00:00 加值 500").is_none());
        assert!(parse_transit_line("悠遊卡交易紀錄").is_none());
        assert!(parse_transit_line("2025-01-15 扣款 -25").is_none());
    }

    #[test]
    fn test_transit_summary() {
        let text = "悠遊卡 交易紀錄\n2025-01-15 08:30:12 捷運台北車站 扣款 -25\n2025-01-15 12:00:00 加值 500\n2025-01-16 18:10:05 307路 -15";
        let fields = parse_text(&TransitCardParser, text, None);

        assert_eq!(fields.records.len(), 2);
        assert_eq!(fields.get("record_count"), "2");
        assert_eq!(fields.get("total_amount"), "40");
        assert_eq!(fields.records[1].mode, TransportMode::Bus);
    }
}
