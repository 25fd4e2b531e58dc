//! Scan command - recognize, classify and extract a single image.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docid_core::{DocumentPipeline, EngineCell};

use super::output::{emit, format_report, OutputFormat};
use super::{load_config, load_engine};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Input image
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip the second OCR pass over the stamp-filtered image
    #[arg(long)]
    no_rescan: bool,

    /// Include the recognized text in the output
    #[arg(long)]
    show_raw: bool,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(dir) = args.model_dir.clone() {
        config.models.model_dir = dir;
    }
    if args.no_rescan {
        config.ocr.enable_rescan = false;
    }

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Loading OCR models...");
    pb.set_position(10);
    let cell = EngineCell::new();
    let engine = load_engine(&cell, &config)?;

    pb.set_message("Loading image...");
    pb.set_position(30);
    let image = image::open(&args.input)
        .with_context(|| format!("Failed to open image {}", args.input.display()))?;

    pb.set_message("Running OCR...");
    pb.set_position(50);
    let pipeline = DocumentPipeline::new(config)?;
    let report = pipeline.process_image(engine, &image)?;

    pb.finish_and_clear();

    let output = format_report(&report, args.format, args.show_raw)?;
    emit(&output, args.output.as_deref())?;

    if !report.is_classified() {
        eprintln!(
            "{} Document type not recognized; showing raw text only.",
            style("⚠").yellow()
        );
    }
    for warning in report.warnings() {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
