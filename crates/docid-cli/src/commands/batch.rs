//! Batch command - scan many documents in one run.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use docid_core::{DocumentPipeline, DocumentReport, EngineCell, PureOcrEngine};

use super::output::{format_report, OutputFormat};
use super::{load_config, load_engine};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "tif", "bmp", "webp"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of images (or `.txt` OCR dumps)
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip the second OCR pass over the stamp-filtered image
    #[arg(long)]
    no_rescan: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    report: Option<DocumentReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(dir) = args.model_dir.clone() {
        config.models.model_dir = dir;
    }
    if args.no_rescan {
        config.ocr.enable_rescan = false;
    }

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let engine_cell: EngineCell<PureOcrEngine> = EngineCell::new();
    let pipeline = DocumentPipeline::new(config)?;

    // Missing models fail the run before any file is touched
    if files.iter().any(|p| extension_of(p) != "txt") {
        load_engine(&engine_cell, pipeline.config())?;
    }

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &pipeline, &engine_cell);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(report) => results.push(ProcessResult {
                path,
                report: Some(report),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = format!("{:#}", e);
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        report: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(ref output_dir) = args.output_dir {
        let mut taken = HashSet::new();
        for result in &results {
            if let Some(report) = &result.report {
                let output_path =
                    unique_output_path(output_dir, &result.path, args.format.extension(), &mut taken);
                fs::write(&output_path, format_report(report, args.format, false)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let unknown = results
        .iter()
        .filter(|r| r.report.as_ref().is_some_and(|rep| !rep.is_classified()))
        .count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} classified, {} unknown, {} failed",
        style(results.len() - failed.len() - unknown).green(),
        style(unknown).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn is_supported(path: &Path) -> bool {
    let ext = extension_of(path);
    ext == "txt" || IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// `<stem>.<ext>` in `output_dir`, numbered `<stem>_2.<ext>`, `<stem>_3.<ext>`
/// and so on when inputs from different folders or with different
/// extensions share a stem.
fn unique_output_path(
    output_dir: &Path,
    input: &Path,
    extension: &str,
    taken: &mut HashSet<PathBuf>,
) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    let mut candidate = output_dir.join(format!("{}.{}", stem, extension));
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = output_dir.join(format!("{}_{}.{}", stem, n, extension));
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

fn process_single_file(
    path: &Path,
    pipeline: &DocumentPipeline,
    engine_cell: &EngineCell<PureOcrEngine>,
) -> anyhow::Result<DocumentReport> {
    if extension_of(path) == "txt" {
        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            anyhow::bail!("Input text is empty");
        }
        return Ok(pipeline.process_text(&text));
    }

    let engine = load_engine(engine_cell, pipeline.config())?;
    let image = image::open(path)?;
    Ok(pipeline.process_image(engine, &image)?)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "type",
        "rule_id",
        "id_no",
        "name",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time = result.processing_time_ms.to_string();

        match &result.report {
            Some(report) => {
                let rule_id = report
                    .classification
                    .as_ref()
                    .map(|c| c.rule_id.as_str())
                    .unwrap_or("");
                let status = if report.is_classified() { "success" } else { "unknown" };
                let warnings = report.warnings().join("; ");
                wtr.write_record([
                    filename,
                    status,
                    report.type_label.as_str(),
                    rule_id,
                    report.field("id_no"),
                    report.field("name"),
                    warnings.as_str(),
                    time.as_str(),
                    "",
                ])?;
            }
            None => {
                wtr.write_record([
                    filename,
                    "error",
                    "",
                    "",
                    "",
                    "",
                    "",
                    time.as_str(),
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
