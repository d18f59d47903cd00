//! Reconciling cluster sets whose clusters share members.
//!
//! Cluster sets produced at different thresholds (or otherwise overlapping)
//! are collapsed so that every agent belongs to at most one output cluster.
//! Grouping is transitive: if A shares a member with B and B with C, all three
//! merge even when A and C are disjoint.

use std::collections::BTreeSet;

use petgraph::unionfind::UnionFind;

use super::{Cluster, cluster_id};

/// Merge clusters that share members into one cluster per connected group.
///
/// Clusters are processed strongest first. A group made of a single cluster
/// is returned unchanged. A larger group unions the members, concatenates the
/// proofs (strongest cluster first), averages the confidences and keeps the
/// strength, structure and signature of its strongest cluster.
///
/// The result is a partition: no two output clusters share a member, so
/// merging it again returns it unchanged.
pub fn merge_clusters(clusters: &[Cluster]) -> Vec<Cluster> {
    if clusters.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&Cluster> = clusters.iter().collect();
    ordered.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut groups = UnionFind::<usize>::new(ordered.len());
    for i in 0..ordered.len() {
        for j in i + 1..ordered.len() {
            if ordered[i].shares_member_with(ordered[j]) {
                groups.union(i, j);
            }
        }
    }

    // Group indices keyed by the first (strongest) cluster reaching each root.
    let mut grouped: Vec<(usize, Vec<&Cluster>)> = Vec::new();
    for (i, &cluster) in ordered.iter().enumerate() {
        let root = groups.find(i);
        match grouped.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(cluster),
            None => grouped.push((root, vec![cluster])),
        }
    }

    let merged: Vec<Cluster> = grouped
        .into_iter()
        .map(|(_, group)| combine(&group))
        .collect();

    tracing::debug!(
        input = clusters.len(),
        output = merged.len(),
        "merged overlapping clusters"
    );
    merged
}

fn combine(group: &[&Cluster]) -> Cluster {
    let strongest = group[0];
    if group.len() == 1 {
        return strongest.clone();
    }

    let members: BTreeSet<String> = group
        .iter()
        .flat_map(|c| c.members.iter().cloned())
        .collect();
    let proofs = group.iter().flat_map(|c| c.proofs.iter().cloned()).collect();
    let confidence = group.iter().map(|c| c.confidence).sum::<f64>() / group.len() as f64;

    Cluster {
        id: cluster_id("merged", &members),
        members,
        shared_structure: strongest.shared_structure.clone(),
        signature: strongest.signature.clone(),
        confidence,
        strength: strongest.strength,
        proofs,
    }
}
