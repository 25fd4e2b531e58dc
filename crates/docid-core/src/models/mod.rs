//! Data models: configuration, rule table, extracted fields.

pub mod config;
pub mod document;
pub mod rules;

pub use config::{DocidConfig, ExtractionConfig, ModelConfig, NormalizeConfig, OcrConfig};
pub use document::{ExtractedFields, ParserKind, TransitRecord, TransportMode};
pub use rules::{DocumentRule, FallbackRule, PrioritySignal, RuleTable, RULE_TABLE_VERSION};
