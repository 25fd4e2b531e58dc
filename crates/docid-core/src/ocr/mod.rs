//! OCR collaborators: recognized lines, the recognizer seam and rescans.

mod cache;
mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use cache::EngineCell;
pub use preprocessing::{ImageFilter, ImagePreprocessor};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OcrError;

/// One recognized line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,

    /// Quadrilateral corners (x1, y1, ..., x4, y4), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f32; 8]>,
}

impl OcrLine {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox: None,
        }
    }

    pub fn with_bbox(mut self, bbox: [f32; 8]) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Axis-aligned (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> Option<(f32, f32, f32, f32)> {
        let bbox = self.bbox?;
        let xs = [bbox[0], bbox[2], bbox[4], bbox[6]];
        let ys = [bbox[1], bbox[3], bbox[5], bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        Some((min_x, min_y, max_x, max_y))
    }
}

/// Recognized lines of one image, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrLineSet {
    pub lines: Vec<OcrLine>,
}

impl OcrLineSet {
    /// Wrap lines, dropping those with no visible text.
    pub fn from_lines(lines: Vec<OcrLine>) -> Self {
        Self {
            lines: lines
                .into_iter()
                .filter(|l| !l.text.trim().is_empty())
                .collect(),
        }
    }

    /// Treat already-recognized text as full-confidence lines.
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(
            text.lines()
                .map(|l| OcrLine::new(l.trim(), 1.0))
                .collect(),
        )
    }

    /// Keep lines at or above `min_confidence`.
    pub fn with_min_confidence(self, min_confidence: f32) -> Self {
        let before = self.lines.len();
        let lines: Vec<OcrLine> = self
            .lines
            .into_iter()
            .filter(|l| l.confidence >= min_confidence)
            .collect();
        if lines.len() < before {
            debug!(
                "Dropped {} lines below confidence {}",
                before - lines.len(),
                min_confidence
            );
        }
        Self { lines }
    }

    /// Sort by reading order (top-to-bottom, left-to-right).
    ///
    /// Lines without a bounding box keep their relative order at the end.
    pub fn sort_by_reading_order(&mut self) {
        self.lines.sort_by(|a, b| match (a.rect(), b.rect()) {
            (Some((ax, ay, _, _)), Some((bx, by, _, _))) => {
                // Group by approximate vertical position (within 20 pixels)
                let row_a = (ay / 20.0) as i32;
                let row_b = (by / 20.0) as i32;
                if row_a != row_b {
                    row_a.cmp(&row_b)
                } else {
                    ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
                }
            }
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    /// Lines joined with newlines.
    pub fn text(&self) -> String {
        self.texts().join("\n")
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Text recognizer over decoded images.
pub trait TextRecognizer {
    /// Recognize text lines in the image.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>, OcrError>;
}

/// Capability to re-run OCR over a filtered copy of the source image.
pub trait Rescan {
    fn rescan(&self, filter: ImageFilter) -> Result<OcrLineSet, OcrError>;
}

/// Rescan backed by a recognizer and the original image.
pub struct ImageRescanner<'a, R: ?Sized> {
    recognizer: &'a R,
    image: &'a DynamicImage,
    preprocessor: ImagePreprocessor,
    min_confidence: f32,
}

impl<'a, R: TextRecognizer + ?Sized> ImageRescanner<'a, R> {
    pub fn new(recognizer: &'a R, image: &'a DynamicImage) -> Self {
        Self {
            recognizer,
            image,
            preprocessor: ImagePreprocessor::new(),
            min_confidence: 0.0,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }
}

impl<R: TextRecognizer + ?Sized> Rescan for ImageRescanner<'_, R> {
    fn rescan(&self, filter: ImageFilter) -> Result<OcrLineSet, OcrError> {
        debug!("Rescanning with {:?}", filter);
        let filtered = self.preprocessor.apply(self.image, filter)?;
        let lines = self.recognizer.recognize(&filtered)?;
        Ok(OcrLineSet::from_lines(lines).with_min_confidence(self.min_confidence))
    }
}
