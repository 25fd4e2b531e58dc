//! Document type classification against the rule table.
//!
//! Precedence is fixed and total:
//!
//! 1. priority signals, in declaration order, select a rule outright;
//! 2. a rule with any exclusion keyword present is vetoed;
//! 3. the remaining rules are scored by counting distinct keywords present,
//!    the highest score wins and ties go to the earliest-declared rule;
//! 4. if nothing scored, the fallback pattern may select its rule, unless
//!    that rule was vetoed or a foreign-country token is present.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RuleError;
use crate::models::document::ParserKind;
use crate::models::rules::{DocumentRule, RuleTable};
use crate::text::{NormalizedText, Normalizer};

/// Why a rule was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchReason {
    /// A priority signal matched.
    Priority { signal: String },
    /// Highest keyword score.
    Score,
    /// Fallback pattern matched after no rule scored.
    Fallback,
}

/// The rule that best matched an input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub rule_id: String,
    pub label: String,
    pub parser: ParserKind,
    /// Keyword score of the selected rule (0 for a vetoed priority target).
    pub score: usize,
    pub reason: MatchReason,
}

/// Per-rule scoring detail, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleScore {
    pub rule_id: String,
    pub score: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vetoed_by: Option<String>,
}

struct CompiledRule {
    rule: DocumentRule,
    keywords: Vec<String>,
    exclusions: Vec<String>,
}

impl CompiledRule {
    fn veto<'a>(&'a self, compact: &str) -> Option<&'a str> {
        self.exclusions
            .iter()
            .find(|k| compact.contains(k.as_str()))
            .map(String::as_str)
    }

    fn score(&self, compact: &str) -> usize {
        self.keywords
            .iter()
            .filter(|k| compact.contains(k.as_str()))
            .count()
    }
}

struct CompiledSignal {
    name: String,
    pattern: Regex,
    rule_index: usize,
}

struct CompiledFallback {
    pattern: Regex,
    rule_index: usize,
    foreign_tokens: Vec<String>,
}

/// Immutable classifier built once from a rule table.
pub struct DocumentClassifier {
    rules: Vec<CompiledRule>,
    priority: Vec<CompiledSignal>,
    fallback: Option<CompiledFallback>,
}

impl DocumentClassifier {
    /// Compile a rule table.
    ///
    /// Keywords pass through `normalizer` so they compare equal to OCR text
    /// normalized the same way.
    pub fn new(table: &RuleTable, normalizer: &Normalizer) -> Result<Self, RuleError> {
        table.validate()?;

        let rules = table
            .rules
            .iter()
            .map(|rule| compile_rule(rule, normalizer))
            .collect::<Result<Vec<_>, _>>()?;

        let index_of = |id: &str| table.rules.iter().position(|r| r.id == id);

        let priority = table
            .priority
            .iter()
            .map(|signal| {
                Ok(CompiledSignal {
                    name: signal.name.clone(),
                    pattern: compile_pattern(&signal.pattern)?,
                    // validate() guarantees the target exists
                    rule_index: index_of(&signal.rule).unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        let fallback = match table.fallback {
            Some(ref fb) => Some(CompiledFallback {
                pattern: compile_pattern(&fb.pattern)?,
                rule_index: index_of(&fb.rule).unwrap_or_default(),
                foreign_tokens: normalize_keywords(&fb.foreign_tokens, normalizer),
            }),
            None => None,
        };

        debug!(
            "Compiled rule table v{}: {} rules, {} priority signals",
            table.version,
            rules.len(),
            priority.len()
        );

        Ok(Self {
            rules,
            priority,
            fallback,
        })
    }

    /// Classifier over the built-in rule table.
    pub fn builtin(normalizer: &Normalizer) -> Result<Self, RuleError> {
        Self::new(&RuleTable::builtin()?, normalizer)
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &DocumentRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Pick the best-matching rule, or `None` when the type is unknown.
    pub fn classify(&self, text: &NormalizedText) -> Option<ClassificationResult> {
        let compact = text.compact.as_str();

        for signal in &self.priority {
            if signal.pattern.is_match(compact) {
                let compiled = &self.rules[signal.rule_index];
                debug!("Priority signal {} selected {}", signal.name, compiled.rule.id);
                return Some(self.result(
                    compiled,
                    compiled.score(compact),
                    MatchReason::Priority {
                        signal: signal.name.clone(),
                    },
                ));
            }
        }

        let mut best: Option<(usize, usize)> = None;
        let mut vetoed = vec![false; self.rules.len()];

        for (index, compiled) in self.rules.iter().enumerate() {
            if let Some(keyword) = compiled.veto(compact) {
                debug!("Rule {} vetoed by {}", compiled.rule.id, keyword);
                vetoed[index] = true;
                continue;
            }

            let score = compiled.score(compact);
            // strict comparison keeps the earliest rule on ties
            if score > best.map(|(_, s)| s).unwrap_or(0) {
                best = Some((index, score));
            }
        }

        if let Some((index, score)) = best {
            let compiled = &self.rules[index];
            debug!("Rule {} selected with score {}", compiled.rule.id, score);
            return Some(self.result(compiled, score, MatchReason::Score));
        }

        let fallback = self.fallback.as_ref()?;
        if vetoed[fallback.rule_index] || !fallback.pattern.is_match(&text.numeric) {
            return None;
        }
        if let Some(token) = fallback
            .foreign_tokens
            .iter()
            .find(|t| compact.contains(t.as_str()))
        {
            debug!("Fallback suppressed by foreign token {}", token);
            return None;
        }

        let compiled = &self.rules[fallback.rule_index];
        debug!("Fallback selected {}", compiled.rule.id);
        Some(self.result(compiled, 0, MatchReason::Fallback))
    }

    /// Score every rule without selecting one.
    pub fn scores(&self, text: &NormalizedText) -> Vec<RuleScore> {
        let compact = text.compact.as_str();
        self.rules
            .iter()
            .map(|compiled| RuleScore {
                rule_id: compiled.rule.id.clone(),
                score: compiled.score(compact),
                vetoed_by: compiled.veto(compact).map(str::to_string),
            })
            .collect()
    }

    fn result(
        &self,
        compiled: &CompiledRule,
        score: usize,
        reason: MatchReason,
    ) -> ClassificationResult {
        ClassificationResult {
            rule_id: compiled.rule.id.clone(),
            label: compiled.rule.label.clone(),
            parser: compiled.rule.parser,
            score,
            reason,
        }
    }
}

fn compile_rule(rule: &DocumentRule, normalizer: &Normalizer) -> Result<CompiledRule, RuleError> {
    let keywords = normalize_keywords(&rule.keywords, normalizer);
    let exclusions = normalize_keywords(&rule.exclusions, normalizer);

    if keywords.is_empty() {
        return Err(RuleError::Validation {
            rule: rule.id.clone(),
            reason: "keywords normalize to nothing".to_string(),
        });
    }

    Ok(CompiledRule {
        rule: rule.clone(),
        keywords,
        exclusions,
    })
}

/// Normalize keywords, dropping blanks and duplicates while keeping order.
fn normalize_keywords(keywords: &[String], normalizer: &Normalizer) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let compact = normalizer.compact(keyword);
        if !compact.is_empty() && !out.contains(&compact) {
            out.push(compact);
        }
    }
    out
}

fn compile_pattern(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classifier() -> (DocumentClassifier, Normalizer) {
        let normalizer = Normalizer::new();
        let classifier = DocumentClassifier::builtin(&normalizer).unwrap();
        (classifier, normalizer)
    }

    fn classify(text: &str) -> Option<String> {
        let (classifier, normalizer) = classifier();
        classifier
            .classify(&normalizer.normalize(text))
            .map(|r| r.rule_id)
    }

    #[test]
    fn test_full_keyword_set_selects_rule() {
        let (classifier, normalizer) = classifier();
        let table = RuleTable::builtin().unwrap();

        for rule in &table.rules {
            let text = rule.keywords.join(" ");
            let result = classifier.classify(&normalizer.normalize(&text));
            assert_eq!(
                result.map(|r| r.rule_id),
                Some(rule.id.clone()),
                "keywords of {} misclassified",
                rule.id
            );
        }
    }

    #[test]
    fn test_any_exclusion_moves_classification_away() {
        let (classifier, normalizer) = classifier();
        let table = RuleTable::builtin().unwrap();

        for rule in table.rules.iter().filter(|r| !r.exclusions.is_empty()) {
            for exclusion in &rule.exclusions {
                let text = format!("{} {}", rule.keywords.join(" "), exclusion);
                let result = classifier.classify(&normalizer.normalize(&text));
                assert_ne!(
                    result.map(|r| r.rule_id),
                    Some(rule.id.clone()),
                    "{} survived exclusion {}",
                    rule.id,
                    exclusion
                );
            }
        }
    }

    #[test]
    fn test_priority_beats_higher_score() {
        let text = "中華民國國民身分證 姓名 出生 性別 統一編號\nP<TWNLIN<<MEI<HUA<<<<<<<<<<";
        let (classifier, normalizer) = classifier();
        let result = classifier.classify(&normalizer.normalize(text)).unwrap();

        assert_eq!(result.rule_id, "passport");
        assert_eq!(
            result.reason,
            MatchReason::Priority {
                signal: "mrz_marker".to_string()
            }
        );
    }

    #[test]
    fn test_tie_goes_to_earliest_rule() {
        let table = RuleTable::from_json(
            r#"{
                "version": 1,
                "rules": [
                    { "id": "first", "label": "First", "keywords": ["ALPHA", "BETA"], "parser": "health_card" },
                    { "id": "second", "label": "Second", "keywords": ["ALPHA", "GAMMA"], "parser": "passport" }
                ]
            }"#,
        )
        .unwrap();
        let normalizer = Normalizer::new();
        let classifier = DocumentClassifier::new(&table, &normalizer).unwrap();

        let result = classifier
            .classify(&normalizer.normalize("alpha beta gamma"))
            .unwrap();
        assert_eq!(result.rule_id, "first");
        assert_eq!(result.score, 2);
    }

    #[test]
    fn test_fallback_on_bare_id_number() {
        let (classifier, normalizer) = classifier();
        let result = classifier
            .classify(&normalizer.normalize("陳小明 A123456789"))
            .unwrap();
        assert_eq!(result.rule_id, "id_card_front");
        assert_eq!(result.reason, MatchReason::Fallback);
    }

    #[test]
    fn test_fallback_tolerates_confusables() {
        assert_eq!(classify("AI23456789"), Some("id_card_front".to_string()));
    }

    #[test]
    fn test_fallback_suppressed_by_foreign_token() {
        assert_eq!(classify("UNITED STATES A123456789"), None);
    }

    #[test]
    fn test_fallback_does_not_resurrect_vetoed_rule() {
        // 悠遊卡 vetoes the ID-card front rule and 身分證 vetoes the transit rule
        assert_eq!(classify("悠遊卡 身分證 A123456789"), None);
    }

    #[test]
    fn test_unknown_text() {
        assert_eq!(classify("hello world"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_scores_report_vetoes() {
        let (classifier, normalizer) = classifier();
        let scores = classifier.scores(&normalizer.normalize("姓名 配偶"));
        let front = scores.iter().find(|s| s.rule_id == "id_card_front").unwrap();
        assert_eq!(front.score, 1);
        assert_eq!(front.vetoed_by.as_deref(), Some("配偶"));
    }

    #[test]
    fn test_simplified_input_matches_traditional_keywords() {
        assert_eq!(classify("中华民国护照"), Some("passport".to_string()));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let table = RuleTable::from_json(
            r#"{
                "version": 1,
                "priority": [{ "name": "bad", "pattern": "P<(", "rule": "a" }],
                "rules": [{ "id": "a", "label": "A", "keywords": ["X"], "parser": "passport" }]
            }"#,
        )
        .unwrap();
        let result = DocumentClassifier::new(&table, &Normalizer::new());
        assert!(matches!(result, Err(RuleError::Pattern { .. })));
    }
}
