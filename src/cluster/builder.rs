//! Cluster construction from accepted homography matches.
//!
//! The match graph is an explicit adjacency map (`agent → neighbours`). Each
//! connected component found by BFS becomes a [`Cluster`] when it is large
//! enough; smaller components are reported as unclustered, never dropped.
//!
//! Both the adjacency map and the neighbour sets are ordered, so traversal
//! order and therefore output are identical across runs.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::homography::HomographyMatch;

use super::{Cluster, cluster_id, cluster_strength, sort_by_strength};

/// Default minimum similarity for an edge.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.6;
/// Default minimum number of members for a cluster.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;

/// Undirected agent graph: agent id → connected agent ids.
pub type Adjacency = BTreeMap<String, BTreeSet<String>>;

/// Output of [`ClusterBuilder::build`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSet {
    /// Retained clusters, strongest first.
    pub clusters: Vec<Cluster>,
    /// Agents with at least one edge whose component was too small.
    pub unclustered: Vec<String>,
}

/// Builds clusters from matches.
#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    min_similarity: f64,
    min_cluster_size: usize,
}

impl Default for ClusterBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SIMILARITY, DEFAULT_MIN_CLUSTER_SIZE)
    }
}

impl ClusterBuilder {
    pub fn new(min_similarity: f64, min_cluster_size: usize) -> Self {
        Self {
            min_similarity,
            min_cluster_size,
        }
    }

    /// Group agents into clusters.
    ///
    /// Only matches with `similarity >= min_similarity` become edges. Each
    /// cluster's confidence, representative structure and proofs are taken
    /// from the edges inside its component, in match order.
    pub fn build(&self, matches: &[HomographyMatch]) -> ClusterSet {
        let edges: Vec<&HomographyMatch> = matches
            .iter()
            .filter(|m| m.similarity >= self.min_similarity)
            .collect();

        let graph = adjacency(&edges);
        let mut set = ClusterSet::default();

        for component in connected_components(&graph) {
            if component.len() < self.min_cluster_size {
                set.unclustered.extend(component);
                continue;
            }
            if let Some(cluster) = assemble(component, &edges) {
                set.clusters.push(cluster);
            }
        }

        sort_by_strength(&mut set.clusters);
        set
    }
}

/// Build the undirected adjacency map for a set of edges.
pub fn adjacency(edges: &[&HomographyMatch]) -> Adjacency {
    let mut graph = Adjacency::new();
    for m in edges {
        graph
            .entry(m.agent_a.clone())
            .or_default()
            .insert(m.agent_b.clone());
        graph
            .entry(m.agent_b.clone())
            .or_default()
            .insert(m.agent_a.clone());
    }
    graph
}

/// Connected components by breadth-first search, in key order of the first
/// member reached.
pub fn connected_components(graph: &Adjacency) -> Vec<BTreeSet<String>> {
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut components = Vec::new();

    for start in graph.keys() {
        if !visited.insert(start.as_str()) {
            continue;
        }
        let mut component = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([start.as_str()]);

        while let Some(node) = queue.pop_front() {
            component.insert(node.to_string());
            for neighbour in graph.get(node).into_iter().flatten() {
                if visited.insert(neighbour.as_str()) {
                    queue.push_back(neighbour.as_str());
                }
            }
        }
        components.push(component);
    }
    components
}

/// Turn one component into a scored cluster.
///
/// Returns `None` only if no edge lies inside the component, which cannot
/// happen for components produced from the same edges.
fn assemble(members: BTreeSet<String>, edges: &[&HomographyMatch]) -> Option<Cluster> {
    let inside: Vec<&HomographyMatch> = edges
        .iter()
        .copied()
        .filter(|m| members.contains(&m.agent_a) && members.contains(&m.agent_b))
        .collect();

    // Highest similarity; the earliest match wins ties.
    let representative = inside.iter().copied().reduce(|best, m| {
        if m.similarity > best.similarity {
            m
        } else {
            best
        }
    })?;

    let confidence = inside.iter().map(|m| m.confidence).sum::<f64>() / inside.len() as f64;
    let proofs = inside.iter().filter_map(|m| m.proof.clone()).collect();

    let mut cluster = Cluster {
        id: cluster_id("cluster", &members),
        members,
        shared_structure: representative.formal_structure.clone(),
        signature: representative.formal_signature.clone(),
        confidence,
        strength: 0.0,
        proofs,
    };
    cluster.strength = cluster_strength(&cluster);
    Some(cluster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Proof;

    fn edge(a: &str, b: &str, similarity: f64, confidence: f64) -> HomographyMatch {
        HomographyMatch {
            agent_a: a.into(),
            agent_b: b.into(),
            element_a: "x".into(),
            element_b: "y".into(),
            formal_structure: format!("{a}-{b}"),
            formal_signature: format!("sig {a}"),
            similarity,
            confidence,
            reasoning: String::new(),
            proof: None,
            verification: None,
        }
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        let set = ClusterBuilder::default().build(&[]);
        assert!(set.clusters.is_empty());
        assert!(set.unclustered.is_empty());
    }

    #[test]
    fn pair_becomes_cluster() {
        let set = ClusterBuilder::default().build(&[edge("thermo", "info", 1.0, 0.934)]);
        assert_eq!(set.clusters.len(), 1);
        let c = &set.clusters[0];
        assert_eq!(c.id, "cluster_info_thermo");
        assert_eq!(c.members.len(), 2);
        assert!((c.confidence - 0.934).abs() < 1e-12);
        let expected = 0.3 * 0.8 + 0.5 * 0.934 + 0.2 * 0.6;
        assert!((c.strength - expected).abs() < 1e-9);
    }

    #[test]
    fn transitive_chain_forms_one_component() {
        let matches = vec![edge("a", "b", 0.9, 0.8), edge("b", "c", 0.7, 0.6)];
        let set = ClusterBuilder::default().build(&matches);
        assert_eq!(set.clusters.len(), 1);
        let c = &set.clusters[0];
        assert_eq!(c.members.len(), 3);
        assert!((c.confidence - 0.7).abs() < 1e-12);
        assert_eq!(c.shared_structure, "a-b");
        assert_eq!(c.signature, "sig a");
    }

    #[test]
    fn representative_tie_goes_to_first_match() {
        let matches = vec![edge("b", "c", 0.8, 0.8), edge("a", "b", 0.8, 0.9)];
        let set = ClusterBuilder::default().build(&matches);
        assert_eq!(set.clusters[0].shared_structure, "b-c");
    }

    #[test]
    fn edges_below_threshold_are_ignored() {
        let matches = vec![edge("a", "b", 0.9, 0.8), edge("b", "c", 0.65, 0.6)];
        let set = ClusterBuilder::new(0.7, 2).build(&matches);
        assert_eq!(set.clusters.len(), 1);
        assert!(!set.clusters[0].members.contains("c"));
    }

    #[test]
    fn small_components_are_reported_unclustered() {
        let matches = vec![
            edge("a", "b", 0.9, 0.8),
            edge("b", "c", 0.9, 0.8),
            edge("x", "y", 0.9, 0.8),
        ];
        let set = ClusterBuilder::new(0.6, 3).build(&matches);
        assert_eq!(set.clusters.len(), 1);
        assert_eq!(set.unclustered, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn proofs_collected_in_match_order() {
        let mut m1 = edge("a", "b", 0.9, 0.8);
        m1.proof = Some(Proof::new("if p then q", vec![]));
        let m2 = edge("b", "c", 0.9, 0.8);
        let mut m3 = edge("a", "c", 0.9, 0.8);
        m3.proof = Some(Proof::new("if r then s", vec![]));
        let set = ClusterBuilder::default().build(&[m1, m2, m3]);
        let proofs: Vec<&str> = set.clusters[0]
            .proofs
            .iter()
            .map(|p| p.conditional.as_str())
            .collect();
        assert_eq!(proofs, vec!["if p then q", "if r then s"]);
    }

    #[test]
    fn clusters_sorted_by_strength() {
        let matches = vec![edge("a", "b", 0.9, 0.5), edge("c", "d", 0.9, 0.95)];
        let set = ClusterBuilder::default().build(&matches);
        assert_eq!(set.clusters.len(), 2);
        assert_eq!(set.clusters[0].id, "cluster_c_d");
        assert!(set.clusters[0].strength > set.clusters[1].strength);
    }

    #[test]
    fn components_are_disjoint_and_cover_the_graph() {
        let m = [
            edge("a", "b", 0.9, 0.8),
            edge("c", "d", 0.9, 0.8),
            edge("d", "e", 0.9, 0.8),
        ];
        let refs: Vec<&HomographyMatch> = m.iter().collect();
        let graph = adjacency(&refs);
        let components = connected_components(&graph);
        assert_eq!(components.len(), 2);
        let total: usize = components.iter().map(|c| c.len()).sum();
        assert_eq!(total, graph.len());
    }
}
