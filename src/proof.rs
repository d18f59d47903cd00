//! Proof verification: structural completeness, internal consistency, and the
//! trivial-limit filter.
//!
//! A cross-domain correspondence claim is worthless if its proof reduces to a
//! generic truism ("the system needs balance"). The verifier flags such
//! conditionals as *trivial* alongside the usual completeness checks.
//!
//! Verification never rejects a proof outright; it reports issues (which make
//! `passed` false) and suggestions (which don't).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::Proof;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

const IF_THEN_WEIGHT: f64 = 0.3;
const EXAMPLES_WEIGHT: f64 = 0.3;
const NO_OTHER_ISSUES_WEIGHT: f64 = 0.2;
const NOT_TRIVIAL_WEIGHT: f64 = 0.2;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Generic hedges that mark a conditional as a trivial limit.
const TRIVIAL_PHRASES: &[&str] = &[
    "需要平衡",
    "要有长远眼光",
    "应该重视",
    "要注意",
    "必须关注",
    "需要优化",
    "应该加强",
    "需要考虑",
    "要注意平衡",
    "应该注意",
    "需要改进",
    "needs balance",
    "should emphasize",
    "long-term vision",
    "pay attention to",
    "needs optimization",
    "should strengthen",
    "needs improvement",
];

/// Substrings that indicate structural content.
const STRUCTURAL_MARKERS: &[&str] = &[
    "=", ">", "<", "→", "->", "∂", "+", "反馈", "回路", "feedback", "loop",
];

const STOP_WORDS: &[&str] = &[
    "的", "是", "在", "与", "和", "或", "但", "而", "the", "an", "and", "or", "of", "is",
];

static RE_DERIVATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"d[A-Za-z]*/d[A-Za-z]").unwrap());

static RE_CONDITION_ZH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"如果(.+?)那么").unwrap());

static RE_CONDITION_EN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bif\s+(.+?)\s+then\b").unwrap());

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Outcome of verifying one proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// True when no issue was raised.
    pub passed: bool,
    /// Weighted completeness score in [0.0, 1.0].
    pub consistency_score: f64,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Verifier
// ---------------------------------------------------------------------------

/// Stateless proof checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProofVerifier;

impl ProofVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify a proof.
    pub fn verify(&self, proof: &Proof) -> VerificationResult {
        let mut issues = Vec::new();
        let mut suggestions = Vec::new();

        let conditional = proof.conditional.trim();
        if conditional.is_empty() {
            issues.push("missing conditional statement".to_string());
            return VerificationResult {
                passed: false,
                consistency_score: 0.0,
                issues,
                suggestions,
            };
        }

        // 1. if-then structure
        let has_if_then = has_if_then_structure(conditional);
        if !has_if_then {
            issues.push("conditional lacks an 'if … then …' structure".to_string());
        }

        // 2. examples
        let has_examples = !proof.examples.is_empty();
        if !has_examples {
            issues.push("missing examples".to_string());
        }
        for (i, example) in proof.examples.iter().enumerate() {
            let n = i + 1;
            if example.source_element.trim().is_empty() {
                issues.push(format!("example {n} is missing its source element"));
            }
            if example.target_element.trim().is_empty() {
                issues.push(format!("example {n} is missing its target element"));
            }
            if example
                .verification_note
                .as_deref()
                .is_none_or(|note| note.trim().is_empty())
            {
                suggestions.push(format!("example {n} could add a verification note"));
            }
        }

        // 3. cross-check condition against the examples (soft)
        if has_examples && has_if_then && !examples_support_condition(conditional, proof) {
            suggestions.push(
                "no example's verification note mentions the condition; \
                 link the examples to the conditional"
                    .to_string(),
            );
        }

        // 4. trivial limit
        let other_issues = issues.len();
        let trivial = is_trivial(conditional);
        if trivial {
            issues.push(
                "trivial limit: generic hedge instead of a structural statement".to_string(),
            );
            suggestions.push(
                "state a concrete formal mapping (e.g. dS/dt > 0) instead of a generic description"
                    .to_string(),
            );
        }

        let consistency_score = weight(has_if_then, IF_THEN_WEIGHT)
            + weight(has_examples, EXAMPLES_WEIGHT)
            + weight(other_issues == 0, NO_OTHER_ISSUES_WEIGHT)
            + weight(!trivial, NOT_TRIVIAL_WEIGHT);

        VerificationResult {
            passed: issues.is_empty(),
            consistency_score,
            issues,
            suggestions,
        }
    }
}

fn weight(flag: bool, w: f64) -> f64 {
    if flag { w } else { 0.0 }
}

/// Whether the text carries a Chinese `如果…那么` or English `if…then` marker pair.
pub fn has_if_then_structure(text: &str) -> bool {
    let lower = text.to_lowercase();
    (text.contains("如果") && text.contains("那么"))
        || (lower.contains("if") && lower.contains("then"))
}

/// Whether the conditional is a trivial limit: a blacklisted hedge, or no
/// structural marker at all.
pub fn is_trivial(text: &str) -> bool {
    let lower = text.to_lowercase();
    if TRIVIAL_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }
    let structural =
        STRUCTURAL_MARKERS.iter().any(|m| lower.contains(m)) || RE_DERIVATIVE.is_match(text);
    !structural
}

/// The condition clause between the if and then markers, if it can be parsed.
fn condition_clause(text: &str) -> Option<&str> {
    RE_CONDITION_ZH
        .captures(text)
        .or_else(|| RE_CONDITION_EN.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

/// Keywords of a clause: `\w+` tokens minus stop words and single characters.
pub fn extract_keywords(text: &str) -> Vec<String> {
    RE_WORD
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > 1 && !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .map(str::to_string)
        .collect()
}

/// True when some example's verification note shares a keyword with the
/// condition clause. An unparsable clause counts as unsupported.
fn examples_support_condition(conditional: &str, proof: &Proof) -> bool {
    let Some(clause) = condition_clause(conditional) else {
        return false;
    };
    let keywords: Vec<String> = extract_keywords(clause)
        .into_iter()
        .map(|k| k.to_lowercase())
        .collect();
    proof
        .examples
        .iter()
        .filter_map(|e| e.verification_note.as_deref())
        .map(str::to_lowercase)
        .any(|note| keywords.iter().any(|k| note.contains(k.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProofExample;

    fn verify(proof: &Proof) -> VerificationResult {
        ProofVerifier::new().verify(proof)
    }

    #[test]
    fn trivial_hedge_without_examples_fails() {
        let proof = Proof::new("系统需要平衡，要有长远眼光", vec![]);
        let result = verify(&proof);
        assert!(!result.passed);
        assert!(result.issues.iter().any(|i| i == "missing examples"));
        assert!(result.issues.iter().any(|i| i.starts_with("trivial limit")));
        assert_eq!(result.consistency_score, 0.0);
    }

    #[test]
    fn structural_conditional_with_matching_example_passes() {
        let proof = Proof::new(
            "如果 dS/dt>0，那么 H(X|Y) 上升",
            vec![
                ProofExample::new("热力学熵增", "信息论噪声")
                    .with_note("dS/dt 为正时条件熵同步上升"),
            ],
        );
        let result = verify(&proof);
        assert!(result.passed, "issues: {:?}", result.issues);
        assert!((result.consistency_score - 1.0).abs() < 1e-9);
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn english_conditional_passes() {
        let proof = Proof::new(
            "if inflow > outflow then stock rises",
            vec![ProofExample::new("reservoir", "inventory").with_note("inflow exceeded outflow")],
        );
        let result = verify(&proof);
        assert!(result.passed, "issues: {:?}", result.issues);
    }

    #[test]
    fn missing_if_then_is_an_issue() {
        let proof = Proof::new("A → B", vec![ProofExample::new("A", "B")]);
        let result = verify(&proof);
        assert!(!result.passed);
        assert!(result.issues.iter().any(|i| i.contains("if … then")));
        // has examples (0.3) + not trivial (0.2)
        assert!((result.consistency_score - 0.5).abs() < 1e-9);
        assert!(result.suggestions.iter().any(|s| s.contains("verification note")));
    }

    #[test]
    fn empty_conditional_short_circuits() {
        let result = verify(&Proof::new("   ", vec![ProofExample::new("a", "b")]));
        assert!(!result.passed);
        assert_eq!(result.consistency_score, 0.0);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn incomplete_example_is_an_issue() {
        let proof = Proof::new(
            "if x > 0 then y > 0",
            vec![ProofExample::new("", "y").with_note("x > 0 observed")],
        );
        let result = verify(&proof);
        assert!(!result.passed);
        assert!(result.issues.iter().any(|i| i.contains("example 1") && i.contains("source")));
        // if-then (0.3) + examples (0.3) + not trivial (0.2)
        assert!((result.consistency_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn unlinked_examples_are_only_a_suggestion() {
        let proof = Proof::new(
            "if pressure > threshold then valve opens",
            vec![ProofExample::new("boiler", "market").with_note("unrelated remark")],
        );
        let result = verify(&proof);
        assert!(result.passed);
        assert!(result.suggestions.iter().any(|s| s.contains("link the examples")));
    }

    #[test]
    fn trivial_lowers_score_even_when_otherwise_complete() {
        let proof = Proof::new(
            "if the team needs balance then results follow",
            vec![ProofExample::new("a", "b").with_note("team balance")],
        );
        let result = verify(&proof);
        assert!(!result.passed);
        assert!((result.consistency_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn triviality_markers() {
        assert!(is_trivial("everything is connected"));
        assert!(!is_trivial("negative feedback stabilizes output"));
        assert!(!is_trivial("dP/dt tracks demand"));
        assert!(!is_trivial("形成反馈回路"));
        assert!(is_trivial("x = y but should emphasize quality"));
    }

    #[test]
    fn keywords_drop_stop_words_and_single_chars() {
        let kws = extract_keywords("the entropy of a system is x");
        assert_eq!(kws, vec!["entropy", "system"]);
    }
}
