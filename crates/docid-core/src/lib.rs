//! Core library for Taiwanese identity-document OCR.
//!
//! This crate provides:
//! - OCR text normalization (script conversion, separator stripping, confusables)
//! - Rule-table driven document classification
//! - Field extraction for ID cards, passports, health cards and transit-card records
//! - A native OCR backend using PaddleOCR models through `pure-onnx-ocr`

pub mod classify;
pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod text;

pub use classify::{ClassificationResult, DocumentClassifier, MatchReason, RuleScore};
pub use error::{DocidError, OcrError, Result, RuleError};
pub use extract::{DocumentParser, ParseInput};
pub use models::{DocidConfig, ExtractedFields, ParserKind, RuleTable, TransitRecord, TransportMode};
pub use ocr::{EngineCell, ImageFilter, ImagePreprocessor, ImageRescanner, OcrLine, OcrLineSet, Rescan, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{DocumentPipeline, DocumentReport, UNKNOWN_LABEL};
pub use text::{NormalizedText, Normalizer};
