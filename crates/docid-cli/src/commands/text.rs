//! Text command - classify and extract already-recognized text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use docid_core::DocumentPipeline;

use super::load_config;
use super::output::{emit, format_report, OutputFormat};

/// Arguments for the text command.
#[derive(Args)]
pub struct TextArgs {
    /// Text file, one OCR line per line (`-` reads stdin)
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include the recognized text in the output
    #[arg(long)]
    show_raw: bool,
}

pub async fn run(args: TextArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let text = if args.input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read {}", args.input))?
    };

    if text.trim().is_empty() {
        anyhow::bail!("Input text is empty");
    }

    let pipeline = DocumentPipeline::new(config)?;
    let report = pipeline.process_text(&text);
    info!("Document type: {}", report.type_label);

    let output = format_report(&report, args.format, args.show_raw)?;
    emit(&output, args.output.as_deref())
}
