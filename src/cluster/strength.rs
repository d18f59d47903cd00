//! Cluster strength scoring.
//!
//! `strength = 0.3·member_weight + 0.5·confidence + 0.2·tightness`
//!
//! The member curve peaks at three agents. Confidence carries the largest
//! weight, so a tight, confident pair outranks a loose, unconfident quintet.

use super::Cluster;

const MEMBER_WEIGHT: f64 = 0.3;
const CONFIDENCE_WEIGHT: f64 = 0.5;
const TIGHTNESS_WEIGHT: f64 = 0.2;

/// Desirability of a cluster of `count` members.
pub fn member_weight(count: usize) -> f64 {
    match count {
        2 => 0.8,
        3 => 1.0,
        4 => 0.9,
        _ => 0.7,
    }
}

/// Proof density: proofs relative to members.
pub fn tightness_weight(proofs: usize, members: usize) -> f64 {
    // Compare 2·proofs with members to avoid a fractional half.
    if proofs >= members {
        1.0
    } else if 2 * proofs >= members {
        0.8
    } else {
        0.6
    }
}

/// Strength of a cluster in [0.0, 1.0].
pub fn cluster_strength(cluster: &Cluster) -> f64 {
    let members = cluster.members.len();
    let score = MEMBER_WEIGHT * member_weight(members)
        + CONFIDENCE_WEIGHT * cluster.confidence
        + TIGHTNESS_WEIGHT * tightness_weight(cluster.proofs.len(), members);
    score.clamp(0.0, 1.0)
}
