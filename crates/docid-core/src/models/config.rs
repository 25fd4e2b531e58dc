//! Configuration structures for the document pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DocidError, Result};

/// Main configuration for the docid pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocidConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Text normalization configuration.
    pub normalize: NormalizeConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,

    /// Rule table file. The built-in table is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Lines recognized below this confidence are dropped (0.0 - 1.0).
    pub min_confidence: f32,

    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Allow parsers to request a second OCR pass over a filtered image.
    pub enable_rescan: bool,

    /// Gamma applied to the red channel for the stamp-removal rescan.
    pub rescan_gamma: f32,

    /// Maximum image dimension (longer side) handed to the recognizer.
    pub max_image_size: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            keep_unk: false,
            enable_rescan: true,
            rescan_gamma: 0.6,
            max_image_size: 2048,
        }
    }
}

/// Text normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Convert simplified Chinese to traditional before keyword matching.
    pub to_traditional: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            to_traditional: true,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Watermark and placeholder text removed from extracted names.
    pub watermarks: Vec<String>,

    /// Locality units marking a line as part of an address.
    pub address_units: Vec<String>,

    /// Tokens that disqualify a passport line from being the holder's name.
    pub passport_blacklist: Vec<String>,

    /// Verify ICAO check digits when a passport MRZ is found.
    pub verify_mrz_checksums: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            watermarks: ["樣本", "样本", "SAMPLE", "Sample", "sample"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            address_units: ["縣", "市", "區", "鄉", "鎮", "村", "里", "鄰", "路", "街", "段", "巷", "弄", "號"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            passport_blacklist: [
                "MINISTRY",
                "REPUBLIC",
                "PASSPORT",
                "SURNAME",
                "GIVEN",
                "NATIONALITY",
                "AUTHORITY",
                "TAIWAN",
                "CHINA",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            verify_mrz_checksums: true,
        }
    }
}

/// Model file locations for the native OCR backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "rec.onnx".to_string(),
            dictionary: "dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// Full paths of the (detection, recognition, dictionary) files.
    pub fn paths(&self) -> (PathBuf, PathBuf, PathBuf) {
        (
            self.model_dir.join(&self.detection_model),
            self.model_dir.join(&self.recognition_model),
            self.model_dir.join(&self.dictionary),
        )
    }

    /// Names of configured model files that do not exist on disk.
    pub fn missing_files(&self) -> Vec<PathBuf> {
        let (det, rec, dict) = self.paths();
        [det, rec, dict].into_iter().filter(|p| !p.exists()).collect()
    }
}

impl DocidConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DocidError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DocidError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
