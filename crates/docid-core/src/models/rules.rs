//! Document rule table: the versioned, externally loaded classification rules.
//!
//! A rule table is a JSON document listing the supported document types in
//! declaration order (which is also the tie-break order), the absolute-priority
//! signals, and an optional fallback pattern. The built-in table ships inside
//! the binary; a replacement can be named in the configuration.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::models::document::ParserKind;

/// Schema version understood by this build.
pub const RULE_TABLE_VERSION: u32 = 1;

static BUILTIN_RULES: &str = include_str!("../../rules/default.json");

/// A complete rule table as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTable {
    /// Schema version.
    pub version: u32,

    /// Signals that select a rule outright, checked in order before scoring.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority: Vec<PrioritySignal>,

    /// Document rules in declaration order.
    pub rules: Vec<DocumentRule>,

    /// Heuristic applied when no rule scores above zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackRule>,
}

/// One document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRule {
    /// Stable identifier, e.g. `id_card_front`.
    pub id: String,

    /// Human-readable label shown to the user.
    pub label: String,

    /// Positive keywords; each one present adds one to the score.
    pub keywords: Vec<String>,

    /// Keywords that veto this rule outright.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,

    /// Field parser for documents of this type.
    pub parser: ParserKind,
}

/// A strong signal that short-circuits scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritySignal {
    /// Name reported in the classification result.
    pub name: String,

    /// Regular expression matched against the compact text view.
    pub pattern: String,

    /// Rule selected when the pattern matches.
    pub rule: String,
}

/// Narrow secondary signal used when no keyword scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRule {
    /// Regular expression matched against the numeric text view.
    pub pattern: String,

    /// Rule selected when the pattern matches.
    pub rule: String,

    /// Any of these in the compact view suppresses the fallback.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_tokens: Vec<String>,
}

impl RuleTable {
    /// The rule table compiled into the binary.
    pub fn builtin() -> Result<Self, RuleError> {
        Self::from_json(BUILTIN_RULES)
    }

    /// Parse and validate a rule table from JSON.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let table: RuleTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Load and validate a rule table from a JSON file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Serialize the table as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, RuleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a rule by identifier.
    pub fn rule(&self, id: &str) -> Option<&DocumentRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Check structural invariants.
    ///
    /// Patterns are only compiled later, when the table is turned into a
    /// classifier.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.version != RULE_TABLE_VERSION {
            return Err(RuleError::UnsupportedVersion {
                found: self.version,
                expected: RULE_TABLE_VERSION,
            });
        }

        if self.rules.is_empty() {
            return Err(RuleError::Validation {
                rule: "<table>".to_string(),
                reason: "no rules declared".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                return Err(invalid(&rule.label, "empty id"));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(invalid(&rule.id, "duplicate id"));
            }
            if rule.keywords.is_empty() {
                return Err(invalid(&rule.id, "no keywords"));
            }
            if rule
                .keywords
                .iter()
                .chain(rule.exclusions.iter())
                .any(|k| k.trim().is_empty())
            {
                return Err(invalid(&rule.id, "blank keyword"));
            }
        }

        for signal in &self.priority {
            if self.rule(&signal.rule).is_none() {
                return Err(invalid(
                    &signal.name,
                    &format!("targets unknown rule {}", signal.rule),
                ));
            }
        }

        if let Some(ref fallback) = self.fallback {
            if self.rule(&fallback.rule).is_none() {
                return Err(invalid(
                    "<fallback>",
                    &format!("targets unknown rule {}", fallback.rule),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(rule: &str, reason: &str) -> RuleError {
    RuleError::Validation {
        rule: rule.to_string(),
        reason: reason.to_string(),
    }
}
