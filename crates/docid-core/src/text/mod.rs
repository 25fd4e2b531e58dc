//! Text normalization for OCR output.

mod normalize;
mod script;

pub use normalize::{confusable_digit, substitute_confusables, NormalizedText, Normalizer};
pub use script::{ScriptConverter, TraditionalConverter};
