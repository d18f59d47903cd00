//! Homography clusters: connected groups of agents whose structural claims agree.
//!
//! - [`builder`]: match graph → connected components → [`Cluster`]s
//! - [`strength`]: weighted desirability of a cluster
//! - [`relationship`]: overlapping / complementary / conflicting cluster pairs
//! - [`merge`]: reconcile cluster sets that share members
//! - [`summary`]: compact summary of a cluster's shared structure

pub mod builder;
pub mod merge;
pub mod relationship;
pub mod strength;
pub mod summary;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::Proof;

pub use builder::{ClusterBuilder, ClusterSet};
pub use merge::merge_clusters;
pub use relationship::{ClusterRelationship, RelationshipKind, analyze_relationships};
pub use strength::cluster_strength;
pub use summary::{ClusterCore, cluster_core};

/// Default minimum strength for [`filter_weak_clusters`].
pub const DEFAULT_MIN_STRENGTH: f64 = 0.6;

/// A connected component of the accepted-match graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Stable id derived from the two smallest member ids.
    pub id: String,
    /// Agent ids; always at least two.
    pub members: BTreeSet<String>,
    /// Representative formal structure.
    pub shared_structure: String,
    /// Representative formal signature.
    pub signature: String,
    /// Mean fused confidence of the contributing matches.
    pub confidence: f64,
    /// See [`cluster_strength`].
    pub strength: f64,
    /// Merged proofs of the contributing matches, in match order.
    pub proofs: Vec<Proof>,
}

impl Cluster {
    /// Whether two clusters share at least one member.
    pub fn shares_member_with(&self, other: &Cluster) -> bool {
        self.members.intersection(&other.members).next().is_some()
    }
}

/// Build a cluster id from a prefix and the two lexicographically smallest members.
pub(crate) fn cluster_id<'a>(prefix: &str, members: impl IntoIterator<Item = &'a String>) -> String {
    let mut sorted: Vec<&String> = members.into_iter().collect();
    sorted.sort();
    let head: Vec<&str> = sorted.iter().take(2).map(|s| s.as_str()).collect();
    format!("{prefix}_{}", head.join("_"))
}

/// Sort clusters by strength descending, id ascending on ties.
pub(crate) fn sort_by_strength(clusters: &mut [Cluster]) {
    clusters.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Keep clusters whose strength is at least `min_strength`.
pub fn filter_weak_clusters(clusters: &[Cluster], min_strength: f64) -> Vec<Cluster> {
    clusters
        .iter()
        .filter(|c| c.strength >= min_strength)
        .cloned()
        .collect()
}
