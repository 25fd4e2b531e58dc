//! Filter command - write the stamp-removal preview of an image.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::info;

use docid_core::{ImageFilter, ImagePreprocessor};

use super::load_config;

/// Arguments for the filter command.
#[derive(Args)]
pub struct FilterArgs {
    /// Input image
    #[arg(required = true)]
    input: PathBuf,

    /// Output image (format from the extension)
    #[arg(short, long, required = true)]
    output: PathBuf,

    /// Red-channel gamma (default: ocr.rescan_gamma)
    #[arg(short, long)]
    gamma: Option<f32>,
}

pub async fn run(args: FilterArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let gamma = args.gamma.unwrap_or(config.ocr.rescan_gamma);

    let image = image::open(&args.input)
        .with_context(|| format!("Failed to open image {}", args.input.display()))?;

    info!("Applying red-channel gamma {}", gamma);
    let filtered = ImagePreprocessor::new().apply(&image, ImageFilter::RedChannelGamma { gamma })?;

    filtered
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "{} Filtered image written to {}",
        style("✓").green(),
        args.output.display()
    );
    Ok(())
}
