//! Relationships between clusters.
//!
//! Every unordered pair of clusters is checked in this order, and the first
//! test that applies decides the relationship:
//!
//! 1. **Overlapping**: member sets intersect; strength is the overlap
//!    relative to the smaller cluster.
//! 2. **Complementary**: signature tokens partially agree (Jaccard strictly
//!    between 0.2 and 0.8).
//! 3. **Conflicting**: the shared structures use opposite terms from a fixed
//!    antonym table.
//!
//! Pairs that pass none of the tests produce no record.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Cluster;

const COMPLEMENTARY_STRENGTH: f64 = 0.7;
const CONFLICTING_STRENGTH: f64 = 0.5;
const JACCARD_LOW: f64 = 0.2;
const JACCARD_HIGH: f64 = 0.8;

/// Opposite terms; a hit in either direction marks a conflict.
const ANTONYMS: &[(&str, &str)] = &[
    ("平衡", "失衡"),
    ("稳定", "变化"),
    ("开放", "封闭"),
    ("增长", "衰退"),
    ("stability", "change"),
    ("open", "closed"),
    ("growth", "decline"),
    ("increase", "decrease"),
    ("expansion", "contraction"),
];

/// Kind of relationship between two clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Overlapping,
    Complementary,
    Conflicting,
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overlapping => write!(f, "overlapping"),
            Self::Complementary => write!(f, "complementary"),
            Self::Conflicting => write!(f, "conflicting"),
        }
    }
}

/// A classified pair of clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRelationship {
    pub cluster_a: String,
    pub cluster_b: String,
    pub kind: RelationshipKind,
    /// Strength in [0.0, 1.0].
    pub strength: f64,
}

/// Classify every unordered pair of clusters, in list order.
pub fn analyze_relationships(clusters: &[Cluster]) -> Vec<ClusterRelationship> {
    let mut relationships = Vec::new();
    for (i, a) in clusters.iter().enumerate() {
        for b in &clusters[i + 1..] {
            if let Some((kind, strength)) = classify(a, b) {
                relationships.push(ClusterRelationship {
                    cluster_a: a.id.clone(),
                    cluster_b: b.id.clone(),
                    kind,
                    strength,
                });
            }
        }
    }
    relationships
}

/// Classify a single pair; `None` when unrelated.
pub fn classify(a: &Cluster, b: &Cluster) -> Option<(RelationshipKind, f64)> {
    let overlap = a.members.intersection(&b.members).count();
    if overlap > 0 {
        let smaller = a.members.len().min(b.members.len());
        return Some((RelationshipKind::Overlapping, overlap as f64 / smaller as f64));
    }
    if are_complementary(a, b) {
        return Some((RelationshipKind::Complementary, COMPLEMENTARY_STRENGTH));
    }
    if are_conflicting(a, b) {
        return Some((RelationshipKind::Conflicting, CONFLICTING_STRENGTH));
    }
    None
}

fn signature_tokens(signature: &str) -> BTreeSet<String> {
    signature
        .replace('_', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard index of the two clusters' signature tokens; `None` when both are empty.
pub fn signature_jaccard(a: &Cluster, b: &Cluster) -> Option<f64> {
    let ta = signature_tokens(&a.signature);
    let tb = signature_tokens(&b.signature);
    let union = ta.union(&tb).count();
    if union == 0 {
        return None;
    }
    Some(ta.intersection(&tb).count() as f64 / union as f64)
}

fn are_complementary(a: &Cluster, b: &Cluster) -> bool {
    signature_jaccard(a, b).is_some_and(|j| j > JACCARD_LOW && j < JACCARD_HIGH)
}

fn are_conflicting(a: &Cluster, b: &Cluster) -> bool {
    let text_a = a.shared_structure.to_lowercase();
    let text_b = b.shared_structure.to_lowercase();
    ANTONYMS.iter().any(|(x, y)| {
        (text_a.contains(x) && text_b.contains(y)) || (text_a.contains(y) && text_b.contains(x))
    })
}
