//! Report formatting shared by the scan, text and batch commands.

use std::fs;
use std::path::Path;

use console::style;

use docid_core::DocumentReport;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
    /// CSV output
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Render a report in the requested format.
pub fn format_report(
    report: &DocumentReport,
    format: OutputFormat,
    show_raw: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            // Unknown documents always carry what was read
            if show_raw || !report.is_classified() {
                Ok(serde_json::to_string_pretty(report)?)
            } else {
                let mut value = serde_json::to_value(report)?;
                if let Some(obj) = value.as_object_mut() {
                    obj.remove("raw_text");
                }
                Ok(serde_json::to_string_pretty(&value)?)
            }
        }
        OutputFormat::Text => Ok(format_report_text(report, show_raw)),
        OutputFormat::Csv => format_report_csv(report),
    }
}

/// Print to stdout, or write to `output` when given.
pub fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!("{} Output written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn format_report_text(report: &DocumentReport, show_raw: bool) -> String {
    let mut output = String::new();

    match &report.classification {
        Some(c) => output.push_str(&format!(
            "Type: {} ({}, score {})\n",
            report.type_label, c.rule_id, c.score
        )),
        None => output.push_str(&format!("Type: {}\n", report.type_label)),
    }

    if let Some(fields) = &report.fields {
        if !fields.fields.is_empty() {
            output.push_str("\nFields:\n");
            for (name, value) in &fields.fields {
                output.push_str(&format!("  {}: {}\n", name, value));
            }
        }

        if !fields.records.is_empty() {
            output.push_str("\nRecords:\n");
            for record in &fields.records {
                output.push_str(&format!(
                    "  {} {} {} {} {}\n",
                    record.short_date(),
                    record.time.format("%H:%M:%S"),
                    record.mode.label(),
                    record.location,
                    record.amount
                ));
            }
        }

        if !fields.warnings.is_empty() {
            output.push_str("\nWarnings:\n");
            for warning in &fields.warnings {
                output.push_str(&format!("  - {}\n", warning));
            }
        }
    }

    if show_raw || !report.is_classified() {
        output.push_str("\nRaw text:\n");
        output.push_str(&report.raw_text);
        output.push('\n');
    }

    output
}

fn format_report_csv(report: &DocumentReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    match &report.fields {
        Some(fields) if !fields.records.is_empty() => {
            wtr.write_record(["date", "time", "mode", "location", "amount"])?;
            for record in &fields.records {
                let date = record.date.format("%Y-%m-%d").to_string();
                let time = record.time.format("%H:%M:%S").to_string();
                let amount = record.amount.to_string();
                wtr.write_record([
                    date.as_str(),
                    time.as_str(),
                    record.mode.label(),
                    record.location.as_str(),
                    amount.as_str(),
                ])?;
            }
        }
        Some(fields) => {
            let mut header = vec!["type"];
            header.extend(fields.fields.keys().map(String::as_str));
            wtr.write_record(&header)?;

            let mut row = vec![report.type_label.as_str()];
            row.extend(fields.fields.values().map(String::as_str));
            wtr.write_record(&row)?;
        }
        None => {
            wtr.write_record(["type", "raw_text"])?;
            wtr.write_record([report.type_label.as_str(), report.raw_text.as_str()])?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
