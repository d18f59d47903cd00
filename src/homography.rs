//! Pairwise homography detection between agent results.
//!
//! For two agents, every candidate of A is compared with every candidate of B
//! in list order; the **first** pair whose structural similarity reaches the
//! threshold becomes the match. Ties are broken by input order, not by the
//! highest score, so the output is deterministic for a given input order.

use serde::{Deserialize, Serialize};

use crate::model::{AgentResult, CandidateCorrespondence, Proof};
use crate::proof::{ProofVerifier, VerificationResult};
use crate::similarity::structural_similarity;

/// Default acceptance threshold for a candidate pair.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;
/// Default cut-off for [`filter_by_confidence`].
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;

const AGENT_CONFIDENCE_WEIGHT: f64 = 0.4;
const SIMILARITY_WEIGHT: f64 = 0.6;

/// An accepted structural correspondence between two agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomographyMatch {
    pub agent_a: String,
    pub agent_b: String,
    /// Source element of agent A's matched candidate.
    pub element_a: String,
    /// Target element of agent B's matched candidate.
    pub element_b: String,
    /// Agent A's structural description.
    pub formal_structure: String,
    /// Agent A's declared signature (may be empty).
    pub formal_signature: String,
    /// Structural similarity in [0.0, 1.0].
    pub similarity: f64,
    /// Fused confidence in [0.0, 1.0].
    pub confidence: f64,
    pub reasoning: String,
    /// Both candidates' proofs, merged.
    pub proof: Option<Proof>,
    /// Verification of the merged proof, kept even when it failed.
    pub verification: Option<VerificationResult>,
}

/// Fuse agent confidences with the structural similarity.
pub fn fuse_confidence(conf_a: f64, conf_b: f64, similarity: f64) -> f64 {
    let fused = AGENT_CONFIDENCE_WEIGHT * (conf_a + conf_b) / 2.0 + SIMILARITY_WEIGHT * similarity;
    fused.clamp(0.0, 1.0)
}

/// Pairwise matcher.
#[derive(Debug, Clone)]
pub struct HomographyMatcher {
    threshold: f64,
    verifier: ProofVerifier,
}

impl Default for HomographyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl HomographyMatcher {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            verifier: ProofVerifier::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Detect the first acceptable homography between two agent results.
    ///
    /// Returns `None` when no candidate pair reaches the threshold, when
    /// either side has no candidates, or when both results belong to the same
    /// agent.
    pub fn detect(&self, a: &AgentResult, b: &AgentResult) -> Option<HomographyMatch> {
        if a.agent_id == b.agent_id {
            return None;
        }
        for candidate_a in &a.candidates {
            for candidate_b in &b.candidates {
                let similarity =
                    structural_similarity(&candidate_a.formal_structure, &candidate_b.formal_structure);
                if similarity >= self.threshold {
                    return Some(self.build_match(a, b, candidate_a, candidate_b, similarity));
                }
            }
        }
        None
    }

    /// Run [`detect`](Self::detect) over every unordered pair of results.
    ///
    /// Matches are sorted by fused confidence, highest first; equal
    /// confidences keep scan order.
    pub fn detect_all(&self, results: &[AgentResult]) -> Vec<HomographyMatch> {
        let mut matches = Vec::new();
        for (i, a) in results.iter().enumerate() {
            for b in &results[i + 1..] {
                if let Some(m) = self.detect(a, b) {
                    tracing::debug!(
                        agent_a = %m.agent_a,
                        agent_b = %m.agent_b,
                        similarity = m.similarity,
                        confidence = m.confidence,
                        "homography accepted"
                    );
                    matches.push(m);
                }
            }
        }
        matches.sort_by(|x, y| {
            y.confidence
                .partial_cmp(&x.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches
    }

    fn build_match(
        &self,
        a: &AgentResult,
        b: &AgentResult,
        candidate_a: &CandidateCorrespondence,
        candidate_b: &CandidateCorrespondence,
        similarity: f64,
    ) -> HomographyMatch {
        let proof = Proof::merge(candidate_a.proof.as_ref(), candidate_b.proof.as_ref());
        let verification = proof.as_ref().map(|p| self.verifier.verify(p));
        HomographyMatch {
            agent_a: a.agent_id.clone(),
            agent_b: b.agent_id.clone(),
            element_a: candidate_a.source_element.clone(),
            element_b: candidate_b.target_element.clone(),
            formal_structure: candidate_a.formal_structure.clone(),
            formal_signature: candidate_a.formal_signature.clone(),
            similarity,
            confidence: fuse_confidence(a.confidence, b.confidence, similarity),
            reasoning: format!(
                "{} and {} share the structure '{}' (similarity: {:.2})",
                candidate_a.source_element,
                candidate_b.target_element,
                candidate_a.formal_structure,
                similarity
            ),
            proof,
            verification,
        }
    }
}

/// Keep matches whose fused confidence is at least `min_confidence`.
pub fn filter_by_confidence(matches: &[HomographyMatch], min_confidence: f64) -> Vec<HomographyMatch> {
    matches
        .iter()
        .filter(|m| m.confidence >= min_confidence)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProofExample;

    fn candidate(source: &str, target: &str, structure: &str) -> CandidateCorrespondence {
        CandidateCorrespondence::new(source, target, structure).unwrap()
    }

    fn agent(id: &str, confidence: f64, candidates: Vec<CandidateCorrespondence>) -> AgentResult {
        AgentResult::new(id, confidence, candidates).unwrap()
    }

    #[test]
    fn identical_structures_match() {
        let a = agent("thermo", 0.85, vec![candidate("熵增", "noise", "dS/dt > 0")]);
        let b = agent("info", 0.82, vec![candidate("信息熵", "entropy", "dS/dt > 0")]);
        let m = HomographyMatcher::default().detect(&a, &b).unwrap();
        assert_eq!(m.similarity, 1.0);
        assert!((m.confidence - (0.4 * 0.835 + 0.6)).abs() < 1e-9);
        assert_eq!(m.element_a, "熵增");
        assert_eq!(m.element_b, "entropy");
        assert!(m.reasoning.contains("1.00"));
        assert!(m.proof.is_none());
        assert!(m.verification.is_none());
    }

    #[test]
    fn unrelated_structures_do_not_match() {
        let a = agent("thermo", 0.85, vec![candidate("熵增", "noise", "dS/dt > 0")]);
        let b = agent("games", 0.7, vec![candidate("博弈", "strategy", "Nash Equilibrium")]);
        assert!(HomographyMatcher::default().detect(&a, &b).is_none());
    }

    #[test]
    fn first_acceptable_pair_wins_over_best() {
        let a = agent(
            "a",
            0.5,
            vec![
                candidate("x1", "y1", "dS/dt > 0 as entropy"),
                candidate("x2", "y2", "dS/dt > 0"),
            ],
        );
        let b = agent("b", 0.5, vec![candidate("u", "v", "dS/dt > 0")]);
        let m = HomographyMatcher::default().detect(&a, &b).unwrap();
        assert_eq!(m.element_a, "x1");
        assert!(m.similarity < 1.0);
    }

    #[test]
    fn empty_candidates_and_self_pairs_yield_nothing() {
        let a = agent("a", 0.9, vec![candidate("x", "y", "dS/dt > 0")]);
        let empty = agent("b", 0.9, vec![]);
        let matcher = HomographyMatcher::default();
        assert!(matcher.detect(&a, &empty).is_none());
        assert!(matcher.detect(&empty, &a).is_none());
        assert!(matcher.detect(&a, &a).is_none());
    }

    #[test]
    fn proofs_are_merged_and_verified() {
        let p_a = Proof::new(
            "if dS/dt > 0 then disorder grows",
            vec![ProofExample::new("gas", "signal").with_note("dS measured positive")],
        );
        let p_b = Proof::new("系统需要平衡", vec![]);
        let a = agent("a", 0.8, vec![candidate("x", "y", "dS/dt > 0").with_proof(p_a)]);
        let b = agent("b", 0.8, vec![candidate("u", "v", "dS/dt > 0").with_proof(p_b)]);
        let m = HomographyMatcher::default().detect(&a, &b).unwrap();
        let proof = m.proof.unwrap();
        assert!(proof.conditional.contains(" ↔ "));
        assert_eq!(proof.examples.len(), 1);
        // The hedge on B's side makes the merged proof trivial; the match is
        // still accepted and the failed verification is preserved.
        let verification = m.verification.unwrap();
        assert!(!verification.passed);
    }

    #[test]
    fn detect_all_sorts_by_confidence() {
        let results = vec![
            agent("a", 0.2, vec![candidate("x", "y", "dS/dt > 0")]),
            agent("b", 0.3, vec![candidate("x", "y", "dS/dt > 0")]),
            agent("c", 0.9, vec![candidate("x", "y", "dS/dt > 0")]),
        ];
        let matches = HomographyMatcher::default().detect_all(&results);
        assert_eq!(matches.len(), 3);
        let pairs: Vec<(&str, &str)> = matches
            .iter()
            .map(|m| (m.agent_a.as_str(), m.agent_b.as_str()))
            .collect();
        assert_eq!(pairs, vec![("b", "c"), ("a", "c"), ("a", "b")]);
        assert!(matches.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn confidence_filter() {
        let results = vec![
            agent("a", 0.0, vec![candidate("x", "y", "dS/dt > 0")]),
            agent("b", 0.0, vec![candidate("x", "y", "dS/dt > 0")]),
            agent("c", 1.0, vec![candidate("x", "y", "dS/dt > 0")]),
            agent("d", 1.0, vec![candidate("x", "y", "dS/dt > 0")]),
        ];
        let matches = HomographyMatcher::default().detect_all(&results);
        let strong = filter_by_confidence(&matches, DEFAULT_MIN_CONFIDENCE);
        // a-b fuse to 0.6; every pair touching c or d reaches at least 0.8
        assert_eq!(matches.len(), 6);
        assert_eq!(strong.len(), 5);
    }
}
