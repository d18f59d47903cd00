// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # homography-engine
//!
//! Detects structural correspondences ("homographies") between the candidate
//! reports of independent analysis agents, verifies their proofs, and groups
//! agents into clusters of mutually consistent structural claims.
//!
//! ## Architecture
//!
//! - **Signatures** (`signature`): symbolic core of a free-text description
//! - **Similarity** (`similarity`): LCS ratio blended with signature overlap
//! - **Proofs** (`proof`): completeness, consistency and trivial-limit checks
//! - **Matching** (`homography`): first-acceptable pairwise matches per agent pair
//! - **Clustering** (`cluster`): connected components, strength, relationships, merging
//! - **Ingestion** (`ingest`): tolerant decoding of agent JSON
//!
//! ## Library usage
//!
//! ```
//! use homography_engine::config::EngineConfig;
//! use homography_engine::engine::Engine;
//! use homography_engine::model::{AgentResult, CandidateCorrespondence};
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! let thermo = AgentResult::new(
//!     "thermodynamics",
//!     0.85,
//!     vec![CandidateCorrespondence::new("entropy", "noise", "dS/dt > 0").unwrap()],
//! )
//! .unwrap();
//! let info = AgentResult::new(
//!     "information_theory",
//!     0.82,
//!     vec![CandidateCorrespondence::new("entropy", "H(X|Y)", "dS/dt > 0").unwrap()],
//! )
//! .unwrap();
//! let report = engine.analyze(&[thermo, info]);
//! assert_eq!(report.clusters.len(), 1);
//! ```

pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod homography;
pub mod ingest;
pub mod model;
pub mod proof;
pub mod signature;
pub mod similarity;
