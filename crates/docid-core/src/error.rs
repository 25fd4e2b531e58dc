//! Error types for the docid-core library.

use thiserror::Error;

/// Main error type for the docid library.
#[derive(Error, Debug)]
pub enum DocidError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Rule table loading or validation error.
    #[error("rule table error: {0}")]
    Rules(#[from] RuleError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Image filtering before a rescan failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to the document rule table.
#[derive(Error, Debug)]
pub enum RuleError {
    /// The rule table is not valid JSON or does not match the schema.
    #[error("failed to parse rule table: {0}")]
    Parse(#[from] serde_json::Error),

    /// The rule table declares a schema version this build does not understand.
    #[error("unsupported rule table version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// A rule or signal is structurally invalid.
    #[error("invalid rule {rule}: {reason}")]
    Validation { rule: String, reason: String },

    /// A signal or fallback pattern failed to compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for the docid library.
pub type Result<T> = std::result::Result<T, DocidError>;
