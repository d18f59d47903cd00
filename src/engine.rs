//! Engine facade: one call from agent results to annotated clusters.
//!
//! The engine is a pure batch computation. Given a closed list of agent
//! results it runs
//!
//! 1. pairwise homography detection,
//! 2. cluster construction and strength scoring,
//! 3. relationship classification and core summaries,
//! 4. optionally, merging of clusters that share members,
//!
//! and returns everything as plain serializable data. No state survives a
//! call. Agents that have not reported are simply absent from the input;
//! waiting for them is the caller's concern.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cluster::{
    Cluster, ClusterBuilder, ClusterCore, ClusterRelationship, analyze_relationships,
    cluster_core, filter_weak_clusters, merge_clusters,
};
use crate::config::{EngineConfig, validate_threshold};
use crate::error::EngineResult;
use crate::homography::{HomographyMatch, HomographyMatcher, filter_by_confidence};
use crate::ingest::{IngestReport, SkipCounts};
use crate::model::{AgentResult, Proof};
use crate::proof::{ProofVerifier, VerificationResult};

/// Everything one engine invocation produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Number of agent results analyzed.
    pub agents: usize,
    /// Accepted matches, highest fused confidence first.
    pub matches: Vec<HomographyMatch>,
    /// Clusters, strongest first.
    pub clusters: Vec<Cluster>,
    pub relationships: Vec<ClusterRelationship>,
    /// Core-structure summary per cluster, in cluster order.
    pub cores: Vec<ClusterCore>,
    /// Clusters merged by shared membership, when merging is enabled.
    pub merged: Option<Vec<Cluster>>,
    /// Agents that belong to no cluster, in input order.
    pub unique_perspectives: Vec<String>,
    /// Malformed input skipped before analysis.
    pub skipped: SkipCounts,
}

/// The homography matching and clustering engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    matcher: HomographyMatcher,
    builder: ClusterBuilder,
    verifier: ProofVerifier,
}

impl Engine {
    /// Create an engine, validating the configuration.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        tracing::debug!(
            threshold = config.matching.threshold,
            min_similarity = config.clustering.min_similarity,
            min_cluster_size = config.clustering.min_cluster_size,
            merge = config.clustering.merge,
            "initializing homography engine"
        );
        Ok(Self {
            matcher: HomographyMatcher::new(config.matching.threshold),
            builder: ClusterBuilder::new(
                config.clustering.min_similarity,
                config.clustering.min_cluster_size,
            ),
            verifier: ProofVerifier::new(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze one closed batch of agent results.
    pub fn analyze(&self, results: &[AgentResult]) -> AnalysisReport {
        let matches = self.matcher.detect_all(results);
        let set = self.builder.build(&matches);
        let relationships = analyze_relationships(&set.clusters);
        let cores = set.clusters.iter().map(cluster_core).collect();
        let merged = self
            .config
            .clustering
            .merge
            .then(|| merge_clusters(&set.clusters));
        let unique_perspectives = unique_perspectives(results, &set.clusters);

        tracing::info!(
            agents = results.len(),
            matches = matches.len(),
            clusters = set.clusters.len(),
            relationships = relationships.len(),
            unique = unique_perspectives.len(),
            "homography analysis complete"
        );

        AnalysisReport {
            agents: results.len(),
            matches,
            clusters: set.clusters,
            relationships,
            cores,
            merged,
            unique_perspectives,
            skipped: SkipCounts::default(),
        }
    }

    /// Analyze a decoded batch, carrying its skip counts into the report.
    pub fn analyze_ingested(&self, ingested: &IngestReport) -> AnalysisReport {
        AnalysisReport {
            skipped: ingested.skipped,
            ..self.analyze(&ingested.results)
        }
    }

    /// Analyze independent batches in parallel, one batch per task.
    pub fn analyze_batches(&self, batches: &[Vec<AgentResult>]) -> Vec<AnalysisReport> {
        batches.par_iter().map(|batch| self.analyze(batch)).collect()
    }

    /// Cluster the same matches at several similarity thresholds and
    /// reconcile the passes into one partition.
    ///
    /// Fails before clustering if any threshold lies outside [0.0, 1.0].
    pub fn cluster_passes(
        &self,
        matches: &[HomographyMatch],
        thresholds: &[f64],
    ) -> EngineResult<Vec<Cluster>> {
        for &threshold in thresholds {
            validate_threshold("passes", threshold)?;
        }
        let mut all = Vec::new();
        for &threshold in thresholds {
            let set = ClusterBuilder::new(threshold, self.config.clustering.min_cluster_size)
                .build(matches);
            tracing::debug!(threshold, clusters = set.clusters.len(), "clustering pass");
            all.extend(set.clusters);
        }
        Ok(merge_clusters(&all))
    }

    /// Verify a single proof.
    pub fn verify_proof(&self, proof: &Proof) -> VerificationResult {
        self.verifier.verify(proof)
    }

    /// Matches at or above the configured confidence cut-off.
    pub fn confident_matches(&self, matches: &[HomographyMatch]) -> Vec<HomographyMatch> {
        filter_by_confidence(matches, self.config.matching.min_confidence)
    }

    /// Clusters at or above the configured strength cut-off.
    pub fn strong_clusters(&self, clusters: &[Cluster]) -> Vec<Cluster> {
        filter_weak_clusters(clusters, self.config.clustering.min_strength)
    }
}

/// Agents present in the input but in no cluster, in input order.
pub fn unique_perspectives(results: &[AgentResult], clusters: &[Cluster]) -> Vec<String> {
    let clustered: BTreeSet<&str> = clusters
        .iter()
        .flat_map(|c| c.members.iter().map(String::as_str))
        .collect();
    results
        .iter()
        .map(|r| r.agent_id.as_str())
        .filter(|id| !clustered.contains(id))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CandidateCorrespondence;

    fn agent(id: &str, confidence: f64, structure: &str) -> AgentResult {
        AgentResult::new(
            id,
            confidence,
            vec![CandidateCorrespondence::new("src", "dst", structure).unwrap()],
        )
        .unwrap()
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.clustering.min_similarity = -0.1;
        assert!(Engine::new(config).is_err());
    }

    #[test]
    fn empty_batch() {
        let report = engine().analyze(&[]);
        assert_eq!(report, AnalysisReport::default());
    }

    #[test]
    fn cluster_plus_unique_perspective() {
        let results = vec![
            agent("thermodynamics", 0.85, "dS/dt > 0"),
            agent("information_theory", 0.82, "dS/dt > 0"),
            agent("game_theory", 0.7, "Nash Equilibrium"),
        ];
        let report = engine().analyze(&results);
        assert_eq!(report.agents, 3);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.clusters.len(), 1);
        assert_eq!(report.cores.len(), 1);
        assert_eq!(report.unique_perspectives, vec!["game_theory".to_string()]);
        assert!(report.merged.is_none());
    }

    #[test]
    fn merge_enabled_reports_merged_clusters() {
        let mut config = EngineConfig::default();
        config.clustering.merge = true;
        let results = vec![agent("a", 0.9, "dS/dt > 0"), agent("b", 0.9, "dS/dt > 0")];
        let report = Engine::new(config).unwrap().analyze(&results);
        assert_eq!(report.merged.as_deref(), Some(report.clusters.as_slice()));
    }

    #[test]
    fn batches_match_sequential_runs() {
        let batches = vec![
            vec![agent("a", 0.9, "dS/dt > 0"), agent("b", 0.8, "dS/dt > 0")],
            vec![agent("c", 0.9, "x = y + 1"), agent("d", 0.6, "Nash Equilibrium")],
        ];
        let engine = engine();
        let parallel = engine.analyze_batches(&batches);
        let sequential: Vec<AnalysisReport> = batches.iter().map(|b| engine.analyze(b)).collect();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn configured_cut_offs_filter_matches_and_clusters() {
        let results = vec![
            agent("a", 0.0, "dS/dt > 0"),
            agent("b", 0.0, "dS/dt > 0"),
            agent("c", 1.0, "negative feedback loop"),
            agent("d", 1.0, "negative feedback loop"),
        ];
        let engine = engine();
        let report = engine.analyze(&results);
        assert_eq!(report.matches.len(), 2);
        // a-b fuse to 0.6, below the 0.7 cut-off
        let confident = engine.confident_matches(&report.matches);
        assert_eq!(confident.len(), 1);
        assert_eq!(confident[0].agent_a, "c");

        // c-d: 0.3·0.8 + 0.5·1.0 + 0.2·0.6 = 0.86; a-b: 0.24 + 0.3 + 0.12 = 0.66
        assert_eq!(engine.strong_clusters(&report.clusters).len(), 2);
        let mut strict = EngineConfig::default();
        strict.clustering.min_strength = 0.8;
        let strict = Engine::new(strict).unwrap();
        let strong = strict.strong_clusters(&report.clusters);
        assert_eq!(strong.len(), 1);
        assert!(strong[0].members.contains("c"));
    }

    #[test]
    fn passes_are_reconciled_into_a_partition() {
        let results = vec![
            agent("a", 0.9, "dS/dt > 0"),
            agent("b", 0.9, "dS/dt > 0"),
            agent("c", 0.9, "dS/dt > 0 when heated"),
        ];
        let engine = engine();
        let matches = engine.analyze(&results).matches;
        let merged = engine.cluster_passes(&matches, &[0.6, 0.95]).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].members.len(), 3);
    }

    #[test]
    fn out_of_range_pass_is_rejected() {
        let results = vec![agent("a", 0.9, "dS/dt > 0"), agent("b", 0.9, "dS/dt > 0")];
        let engine = engine();
        let matches = engine.analyze(&results).matches;
        for bad in [1.5, -0.2, f64::NAN] {
            let err = engine.cluster_passes(&matches, &[0.6, bad]).unwrap_err();
            assert!(matches!(
                err,
                crate::error::EngineError::Config(crate::error::ConfigError::Invalid { .. })
            ));
        }
    }
}
