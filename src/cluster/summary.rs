//! Core-structure summary of a cluster.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Cluster;

/// Maximum number of common elements reported.
const MAX_COMMON_ELEMENTS: usize = 10;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// What a cluster's members agree on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCore {
    pub cluster_id: String,
    pub members: Vec<String>,
    pub core_structure: String,
    pub core_signature: String,
    /// Lowercase tokens present in every proof conditional, sorted.
    pub common_elements: Vec<String>,
    pub strength: f64,
    pub confidence: f64,
}

/// Summarize a cluster's core structure.
pub fn cluster_core(cluster: &Cluster) -> ClusterCore {
    ClusterCore {
        cluster_id: cluster.id.clone(),
        members: cluster.members.iter().cloned().collect(),
        core_structure: cluster.shared_structure.clone(),
        core_signature: cluster.signature.clone(),
        common_elements: common_elements(
            cluster
                .proofs
                .iter()
                .map(|p| p.conditional.as_str())
                .filter(|c| !c.is_empty()),
        ),
        strength: cluster.strength,
        confidence: cluster.confidence,
    }
}

/// Tokens shared by every text, lowercased and sorted, at most ten.
fn common_elements<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut common: Option<BTreeSet<String>> = None;
    for text in texts {
        let lower = text.to_lowercase();
        let words: BTreeSet<String> = RE_WORD
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect();
        common = Some(match common {
            Some(acc) => acc.intersection(&words).cloned().collect(),
            None => words,
        });
    }
    common
        .unwrap_or_default()
        .into_iter()
        .take(MAX_COMMON_ELEMENTS)
        .collect()
}
