//! Engine configuration, persisted as TOML.
//!
//! Every key is optional; missing keys fall back to the defaults below. The
//! configuration is read once per invocation and never altered by the engine.
//!
//! ```toml
//! [matching]
//! threshold = 0.6
//! min_confidence = 0.7
//!
//! [clustering]
//! min_similarity = 0.6
//! min_cluster_size = 2
//! min_strength = 0.6
//! merge = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cluster::DEFAULT_MIN_STRENGTH;
use crate::cluster::builder::{DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_MIN_SIMILARITY};
use crate::error::ConfigError;
use crate::homography::{DEFAULT_MATCH_THRESHOLD, DEFAULT_MIN_CONFIDENCE};

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Pairwise matching settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Similarity a candidate pair needs to become a homography.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Cut-off used when filtering matches by fused confidence.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

/// Clustering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Similarity a match needs to become a graph edge.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
    /// Components smaller than this are reported as unique perspectives.
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,
    /// Cut-off used when filtering weak clusters.
    #[serde(default = "default_min_strength")]
    pub min_strength: f64,
    /// Also report clusters merged by shared membership.
    #[serde(default)]
    pub merge: bool,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
}

fn default_threshold() -> f64 {
    DEFAULT_MATCH_THRESHOLD
}
fn default_min_confidence() -> f64 {
    DEFAULT_MIN_CONFIDENCE
}
fn default_min_similarity() -> f64 {
    DEFAULT_MIN_SIMILARITY
}
fn default_min_cluster_size() -> usize {
    DEFAULT_MIN_CLUSTER_SIZE
}
fn default_min_strength() -> f64 {
    DEFAULT_MIN_STRENGTH
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            min_confidence: default_min_confidence(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            min_cluster_size: default_min_cluster_size(),
            min_strength: default_min_strength(),
            merge: false,
        }
    }
}

impl EngineConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml(content: &str, origin: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Reject thresholds outside [0.0, 1.0] and a zero cluster size.
    pub fn validate(&self) -> ConfigResult<()> {
        let thresholds = [
            ("matching.threshold", self.matching.threshold),
            ("matching.min_confidence", self.matching.min_confidence),
            ("clustering.min_similarity", self.clustering.min_similarity),
            ("clustering.min_strength", self.clustering.min_strength),
        ];
        for (name, value) in thresholds {
            validate_threshold(name, value)?;
        }
        if self.clustering.min_cluster_size == 0 {
            return Err(ConfigError::Invalid {
                message: "clustering.min_cluster_size must be >= 1".into(),
            });
        }
        Ok(())
    }
}

/// Reject a threshold outside [0.0, 1.0] (NaN included).
pub fn validate_threshold(name: &str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            message: format!("{name} must be in [0.0, 1.0], got {value}"),
        })
    }
}
