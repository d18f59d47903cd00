//! Decoding agent output into validated [`AgentResult`]s.
//!
//! Agents report loosely structured JSON. Each result, candidate and proof is
//! decoded independently; anything malformed is skipped with a warning and
//! counted, so one broken record never hides the rest of the batch.
//!
//! Both the agents' native field names (`agent`, `homography_candidates`,
//! `domain_a_element`, `if_then_logic`, …) and the engine's own names are
//! accepted.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InputError;
use crate::model::{AgentResult, CandidateCorrespondence, Proof, ProofExample};

/// Confidence assumed when an agent does not report one.
pub const DEFAULT_AGENT_CONFIDENCE: f64 = 0.5;

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

// The two naming schemes are separate fields rather than serde aliases, so a
// record carrying both forms still decodes. Engine names take precedence.
#[derive(Debug, Deserialize)]
struct RawAgentResult {
    agent_id: Option<String>,
    agent: Option<String>,
    confidence: Option<f64>,
    candidates: Option<Vec<Value>>,
    homography_candidates: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    #[serde(alias = "domain_a_element")]
    source_element: Option<String>,
    #[serde(alias = "domain_b_element")]
    target_element: Option<String>,
    formal_structure: Option<String>,
    #[serde(alias = "formal_structure_signature")]
    formal_signature: Option<String>,
    #[serde(alias = "verification_proof")]
    proof: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawProof {
    #[serde(default, alias = "if_then_logic")]
    conditional: String,
    #[serde(default)]
    examples: Vec<RawExample>,
}

#[derive(Debug, Deserialize)]
struct RawExample {
    #[serde(default, alias = "domain_a_element")]
    source_element: String,
    #[serde(default, alias = "domain_b_element")]
    target_element: String,
    #[serde(alias = "verification")]
    verification_note: Option<String>,
}

impl From<RawProof> for Proof {
    fn from(raw: RawProof) -> Self {
        Proof {
            conditional: raw.conditional,
            examples: raw
                .examples
                .into_iter()
                .map(|e| ProofExample {
                    source_element: e.source_element,
                    target_element: e.target_element,
                    verification_note: e.verification_note,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Number of items skipped while decoding a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    pub results: usize,
    pub candidates: usize,
    pub proofs: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.results + self.candidates + self.proofs
    }
}

/// Decoded batch plus what had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub results: Vec<AgentResult>,
    pub skipped: SkipCounts,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Read and decode an agent results file.
pub fn load_agent_results(path: &Path) -> Result<IngestReport, InputError> {
    let content = std::fs::read_to_string(path).map_err(|e| InputError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_agent_results(&content)
}

/// Decode a JSON array of agent results.
///
/// Fails only if the document is not a JSON array; malformed items inside it
/// are skipped.
pub fn parse_agent_results(json: &str) -> Result<IngestReport, InputError> {
    let items: Vec<Value> = serde_json::from_str(json).map_err(|e| InputError::Json {
        message: e.to_string(),
    })?;
    Ok(decode_values(items))
}

/// Read and decode a single proof file.
pub fn load_proof(path: &Path) -> Result<Proof, InputError> {
    let content = std::fs::read_to_string(path).map_err(|e| InputError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_proof(&content)
}

/// Decode a single proof object, accepting both naming schemes.
pub fn parse_proof(json: &str) -> Result<Proof, InputError> {
    let raw: RawProof = serde_json::from_str(json).map_err(|e| InputError::Proof {
        message: e.to_string(),
    })?;
    Ok(raw.into())
}

/// Decode already-parsed JSON values.
pub fn decode_values(items: Vec<Value>) -> IngestReport {
    let mut report = IngestReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let Some(result) = decode_result(index, item, &mut report.skipped) else {
            report.skipped.results += 1;
            continue;
        };
        if !seen.insert(result.agent_id.clone()) {
            tracing::warn!(index, agent = %result.agent_id, "duplicate agent id, skipping result");
            report.skipped.results += 1;
            continue;
        }
        report.results.push(result);
    }

    if report.skipped.total() > 0 {
        tracing::warn!(
            results = report.skipped.results,
            candidates = report.skipped.candidates,
            proofs = report.skipped.proofs,
            "skipped malformed input"
        );
    }
    report
}

fn decode_result(index: usize, item: Value, skipped: &mut SkipCounts) -> Option<AgentResult> {
    let raw: RawAgentResult = match serde_json::from_value(item) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(index, error = %e, "undecodable agent result, skipping");
            return None;
        }
    };

    let agent_id = raw.agent_id.or(raw.agent).unwrap_or_default();
    let values = raw
        .candidates
        .or(raw.homography_candidates)
        .unwrap_or_default();
    let mut candidates = Vec::with_capacity(values.len());
    for (position, value) in values.into_iter().enumerate() {
        match decode_candidate(value, skipped) {
            Ok(c) => candidates.push(c),
            Err(e) => {
                tracing::warn!(agent = %agent_id, position, error = %e, "skipping candidate");
                skipped.candidates += 1;
            }
        }
    }

    let confidence = raw.confidence.unwrap_or(DEFAULT_AGENT_CONFIDENCE);
    match AgentResult::new(agent_id, confidence, candidates) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::warn!(index, error = %e, "invalid agent result, skipping");
            None
        }
    }
}

fn decode_candidate(
    value: Value,
    skipped: &mut SkipCounts,
) -> Result<CandidateCorrespondence, String> {
    let raw: RawCandidate = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let mut candidate = CandidateCorrespondence::new(
        raw.source_element.unwrap_or_default(),
        raw.target_element.unwrap_or_default(),
        raw.formal_structure.unwrap_or_default(),
    )
    .map_err(|e| e.to_string())?
    .with_signature(raw.formal_signature.unwrap_or_default());

    match raw.proof {
        None | Some(Value::Null) => {}
        Some(value) => match serde_json::from_value::<RawProof>(value) {
            Ok(proof) => candidate = candidate.with_proof(proof.into()),
            Err(e) => {
                tracing::warn!(error = %e, "undecodable proof, candidate kept without it");
                skipped.proofs += 1;
            }
        },
    }
    Ok(candidate)
}
