//! Recognized text to classified, extracted document.

use std::time::Instant;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{ClassificationResult, DocumentClassifier};
use crate::error::Result;
use crate::extract::ParseInput;
use crate::models::config::DocidConfig;
use crate::models::document::ExtractedFields;
use crate::models::rules::RuleTable;
use crate::ocr::{ImageRescanner, OcrLineSet, Rescan, TextRecognizer};
use crate::text::Normalizer;

/// Label reported when no rule matched.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Outcome of processing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Matched rule, if any.
    pub classification: Option<ClassificationResult>,

    /// Document type label, `unknown` when unclassified.
    pub type_label: String,

    /// Extracted fields, absent when unclassified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ExtractedFields>,

    /// Recognized text, one line per OCR line.
    pub raw_text: String,

    /// Number of recognized lines.
    pub line_count: usize,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl DocumentReport {
    pub fn is_classified(&self) -> bool {
        self.classification.is_some()
    }

    /// Extracted field value, or the empty string.
    pub fn field(&self, name: &str) -> &str {
        self.fields.as_ref().map(|f| f.get(name)).unwrap_or("")
    }

    /// Extraction warnings.
    pub fn warnings(&self) -> &[String] {
        self.fields
            .as_ref()
            .map(|f| f.warnings.as_slice())
            .unwrap_or(&[])
    }
}

/// Classifier and parsers wired together with one configuration.
pub struct DocumentPipeline {
    config: DocidConfig,
    normalizer: Normalizer,
    classifier: DocumentClassifier,
}

impl DocumentPipeline {
    /// Build a pipeline, loading the configured rule file or the built-in
    /// table.
    pub fn new(config: DocidConfig) -> Result<Self> {
        let table = match config.rules_path {
            Some(ref path) => {
                info!("Loading rule table from {}", path.display());
                RuleTable::from_file(path)?
            }
            None => RuleTable::builtin()?,
        };
        Self::with_rules(config, &table)
    }

    /// Build a pipeline over an explicit rule table.
    pub fn with_rules(config: DocidConfig, table: &RuleTable) -> Result<Self> {
        let normalizer = Normalizer::from_config(&config.normalize);
        let classifier = DocumentClassifier::new(table, &normalizer)?;
        debug!("Pipeline ready with {} rules", table.rules.len());
        Ok(Self {
            config,
            normalizer,
            classifier,
        })
    }

    pub fn config(&self) -> &DocidConfig {
        &self.config
    }

    pub fn classifier(&self) -> &DocumentClassifier {
        &self.classifier
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Classify and extract already-recognized text.
    pub fn process_text(&self, text: &str) -> DocumentReport {
        self.process_lines(OcrLineSet::from_text(text), None)
    }

    /// Classify and extract recognized lines.
    pub fn process_lines(&self, lines: OcrLineSet, rescan: Option<&dyn Rescan>) -> DocumentReport {
        let start = Instant::now();
        let raw_text = lines.text();
        let normalized = self.normalizer.normalize(&raw_text);
        let classification = self.classifier.classify(&normalized);

        let (type_label, fields) = match classification {
            Some(ref result) => {
                info!(
                    "Classified as {} ({:?}, score {})",
                    result.rule_id, result.reason, result.score
                );
                let input = ParseInput {
                    label: &result.label,
                    normalized: &normalized,
                    lines: &lines,
                    normalizer: &self.normalizer,
                    config: &self.config.extraction,
                    ocr: &self.config.ocr,
                };
                let fields = result.parser.parser().parse(&input, rescan);
                (result.label.clone(), Some(fields))
            }
            None => {
                info!("Document type unknown");
                (UNKNOWN_LABEL.to_string(), None)
            }
        };

        DocumentReport {
            classification,
            type_label,
            fields,
            raw_text,
            line_count: lines.len(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Recognize, classify and extract an image.
    pub fn process_image<R>(&self, recognizer: &R, image: &DynamicImage) -> Result<DocumentReport>
    where
        R: TextRecognizer + ?Sized,
    {
        let start = Instant::now();
        let lines = OcrLineSet::from_lines(recognizer.recognize(image)?)
            .with_min_confidence(self.config.ocr.min_confidence);
        debug!("Recognized {} lines", lines.len());

        let rescanner = ImageRescanner::new(recognizer, image)
            .with_min_confidence(self.config.ocr.min_confidence);
        let rescan: Option<&dyn Rescan> = if self.config.ocr.enable_rescan {
            Some(&rescanner)
        } else {
            None
        };

        let mut report = self.process_lines(lines, rescan);
        report.processing_time_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }
}
