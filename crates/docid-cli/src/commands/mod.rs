//! CLI commands.

pub mod batch;
pub mod config;
pub mod filter;
pub mod output;
pub mod rules;
pub mod scan;
pub mod text;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use docid_core::{DocidConfig, EngineCell, PureOcrEngine};

/// `<config dir>/docid/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docid")
        .join("config.json")
}

/// Load the configuration named on the command line, else the default file
/// if it exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DocidConfig> {
    if let Some(path) = config_path {
        return DocidConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config {}", default_path.display());
        return DocidConfig::from_file(&default_path)
            .with_context(|| format!("Failed to load config {}", default_path.display()));
    }

    Ok(DocidConfig::default())
}

/// Build the OCR engine on first use.
pub fn load_engine<'a>(
    cell: &'a EngineCell<PureOcrEngine>,
    config: &DocidConfig,
) -> anyhow::Result<&'a PureOcrEngine> {
    cell.get_or_try_init(|| PureOcrEngine::from_models(&config.models, config.ocr.clone()))
        .with_context(|| {
            format!(
                "OCR models not available in {}. Set models.model_dir or pass --model-dir.",
                config.models.model_dir.display()
            )
        })
}
