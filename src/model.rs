//! Input records produced by the analysis agents.
//!
//! These are the validated forms of what upstream agents report. Required
//! fields are checked once, at construction, so the rest of the engine never
//! has to ask whether a string is present.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// One verification instance backing a proof.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProofExample {
    /// Element on the source side of the correspondence.
    #[serde(default)]
    pub source_element: String,
    /// Element on the target side of the correspondence.
    #[serde(default)]
    pub target_element: String,
    /// Free-text note explaining why the instance holds.
    #[serde(default)]
    pub verification_note: Option<String>,
}

impl ProofExample {
    pub fn new(source_element: impl Into<String>, target_element: impl Into<String>) -> Self {
        Self {
            source_element: source_element.into(),
            target_element: target_element.into(),
            verification_note: None,
        }
    }

    /// Attach a verification note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.verification_note = Some(note.into());
        self
    }
}

/// A conditional statement plus example instances supporting a correspondence.
///
/// Proofs are verified (never rejected) at construction; see
/// [`crate::proof::ProofVerifier`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Proof {
    /// The "if P then Q" statement.
    pub conditional: String,
    /// Instances of the correspondence.
    #[serde(default)]
    pub examples: Vec<ProofExample>,
}

impl Proof {
    pub fn new(conditional: impl Into<String>, examples: Vec<ProofExample>) -> Self {
        Self {
            conditional: conditional.into(),
            examples,
        }
    }

    /// Combine the proofs of two matched candidates.
    ///
    /// Conditionals are joined with a biconditional and the example lists are
    /// concatenated. When only one side carries a proof it is used as-is.
    pub fn merge(a: Option<&Proof>, b: Option<&Proof>) -> Option<Proof> {
        match (a, b) {
            (Some(a), Some(b)) => Some(Proof {
                conditional: format!("{} ↔ {}", a.conditional, b.conditional),
                examples: a.examples.iter().chain(&b.examples).cloned().collect(),
            }),
            (Some(p), None) | (None, Some(p)) => Some(p.clone()),
            (None, None) => None,
        }
    }
}

/// One proposed mapping inside an agent's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCorrespondence {
    pub source_element: String,
    pub target_element: String,
    /// Free-text structural description used for similarity.
    pub formal_structure: String,
    /// Agent-supplied signature; may be empty.
    #[serde(default)]
    pub formal_signature: String,
    #[serde(default)]
    pub proof: Option<Proof>,
}

impl CandidateCorrespondence {
    /// Create a candidate, rejecting empty required fields.
    pub fn new(
        source_element: impl Into<String>,
        target_element: impl Into<String>,
        formal_structure: impl Into<String>,
    ) -> Result<Self, InputError> {
        let source_element = required(source_element.into(), "source_element")?;
        let target_element = required(target_element.into(), "target_element")?;
        let formal_structure = required(formal_structure.into(), "formal_structure")?;
        Ok(Self {
            source_element,
            target_element,
            formal_structure,
            formal_signature: String::new(),
            proof: None,
        })
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.formal_signature = signature.into();
        self
    }

    pub fn with_proof(mut self, proof: Proof) -> Self {
        self.proof = Some(proof);
        self
    }
}

/// One agent's complete output for a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Unique agent identifier within a batch.
    pub agent_id: String,
    /// Self-reported confidence in [0.0, 1.0].
    pub confidence: f64,
    /// Candidates in the order the agent reported them.
    pub candidates: Vec<CandidateCorrespondence>,
}

impl AgentResult {
    /// Create an agent result. The confidence is clamped to [0.0, 1.0].
    pub fn new(
        agent_id: impl Into<String>,
        confidence: f64,
        candidates: Vec<CandidateCorrespondence>,
    ) -> Result<Self, InputError> {
        let agent_id = required(agent_id.into(), "agent_id")?;
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Ok(Self {
            agent_id,
            confidence,
            candidates,
        })
    }
}

fn required(value: String, field: &'static str) -> Result<String, InputError> {
    if value.trim().is_empty() {
        Err(InputError::MissingField { field })
    } else {
        Ok(value)
    }
}
