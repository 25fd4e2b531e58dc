//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{ImagePreprocessor, OcrLine, OcrLineSet, TextRecognizer};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
    preprocessor: ImagePreprocessor,
}

impl PureOcrEngine {
    /// Create an engine from the configured model files.
    pub fn from_models(models: &ModelConfig, config: OcrConfig) -> Result<Self, OcrError> {
        let missing = models.missing_files();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            return Err(OcrError::ModelLoad(format!(
                "missing model files: {}",
                names.join(", ")
            )));
        }

        let (det_path, rec_path, dict_path) = models.paths();
        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", models.model_dir.display());

        let preprocessor = ImagePreprocessor::new().with_max_size(config.max_image_size);
        Ok(Self {
            engine,
            config,
            preprocessor,
        })
    }

    /// Recognize and return lines in reading order.
    pub fn process(&self, image: &DynamicImage) -> Result<OcrLineSet, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        info!("Processing image: {}x{}", width, height);
        let image = self.preprocessor.limit_size(image);

        let results = self
            .engine
            .run_from_image(&image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let lines: Vec<OcrLine> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                OcrLine::new(text, r.confidence).with_bbox(polygon_to_bbox(&r.bounding_box))
            })
            .collect();

        let mut set = OcrLineSet::from_lines(lines).with_min_confidence(self.config.min_confidence);
        set.sort_by_reading_order();

        info!(
            "OCR complete: {} lines in {}ms",
            set.len(),
            start.elapsed().as_millis()
        );

        Ok(set)
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>, OcrError> {
        Ok(self.process(image)?.lines)
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
