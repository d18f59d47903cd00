//! Formal signature extraction.
//!
//! A signature is the symbolic core of a structural description: equations,
//! function applications, derivatives, integrals, operators and subscripted
//! identifiers. Two descriptions with different wording but the same symbolic
//! core should share a signature.

use std::sync::LazyLock;

use regex::Regex;

// ── Patterns ────────────────────────────────────────────────────────────
// Order matters: all matches of the first pattern come first in the output.

static RE_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]\s*=\s*[^,;\n]+").unwrap());

static RE_FUNCTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]\([^)]+\)").unwrap());

static RE_DERIVATIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"d[A-Z]/dt").unwrap());

static RE_PARTIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"∂[A-Z]/∂[a-z]").unwrap());

static RE_INTEGRAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"∫[^∫]+dt").unwrap());

static RE_OPERATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[∑∏√±÷×<>≤≥]").unwrap());

static RE_SUBSCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+_\{[^}]+\}").unwrap());

fn patterns() -> [&'static Regex; 7] {
    [
        &RE_ASSIGNMENT,
        &RE_FUNCTION,
        &RE_DERIVATIVE,
        &RE_PARTIAL,
        &RE_INTEGRAL,
        &RE_OPERATOR,
        &RE_SUBSCRIPT,
    ]
}

/// Extract the formal signature of `text`.
///
/// Returns the matched fragments joined by single spaces, or an empty string
/// when the text has no symbolic content.
pub fn extract_signature(text: &str) -> String {
    let fragments: Vec<&str> = patterns()
        .into_iter()
        .flat_map(|re| re.find_iter(text).map(|m| m.as_str()))
        .collect();
    fragments.join(" ")
}
