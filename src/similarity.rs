//! Structural similarity between free-text descriptions.
//!
//! Raw text overlap is measured with a longest-common-subsequence ratio. When
//! both descriptions carry a formal signature the signature overlap dominates
//! the score, so shared symbolic structure outranks shared wording.

use crate::signature::extract_signature;

/// Weight of raw text overlap when both signatures are present.
pub const RAW_WEIGHT: f64 = 0.3;
/// Weight of signature overlap when both signatures are present.
pub const SIGNATURE_WEIGHT: f64 = 0.7;

/// LCS ratio `2·|LCS(a, b)| / (|a| + |b|)` over Unicode scalar values.
///
/// Two empty strings are identical (1.0). The ratio is symmetric because the
/// LCS length is.
pub fn lcs_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * lcs_len(&a, &b) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    // Two-row DP; iterate over the shorter sequence in the inner loop.
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; inner.len() + 1];
    let mut curr = vec![0usize; inner.len() + 1];
    for &x in outer {
        for (j, &y) in inner.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[inner.len()]
}

/// Structural similarity in [0.0, 1.0].
///
/// Characters are compared as written: only identical strings score 1.0, and
/// strings with no character in common score 0.0.
pub fn structural_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let raw = lcs_ratio(a, b);

    let sig_a = extract_signature(a);
    let sig_b = extract_signature(b);
    if sig_a.is_empty() || sig_b.is_empty() {
        return raw;
    }

    let signature = lcs_ratio(&sig_a, &sig_b);
    (RAW_WEIGHT * raw + SIGNATURE_WEIGHT * signature).clamp(0.0, 1.0)
}
