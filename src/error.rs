//! Rich diagnostic error types for the homography engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! so operators get an error code and help text alongside the message.
//!
//! Note that most heterogeneity in agent output is *not* an error: malformed
//! records are skipped and counted by [`crate::ingest`], a missing match is
//! `None`, and an empty cluster set is an empty `Vec`.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the homography engine.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Input(#[from] InputError),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read engine config: {path}")]
    #[diagnostic(
        code(homography::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse engine config {path}: {message}")]
    #[diagnostic(
        code(homography::config::parse),
        help(
            "Check the TOML syntax. Known sections are [matching] and [clustering]; \
             every key is optional and falls back to its default."
        )
    )]
    Parse { path: String, message: String },

    #[error("invalid engine config: {message}")]
    #[diagnostic(
        code(homography::config::invalid),
        help(
            "Similarity, confidence and strength thresholds must lie in [0.0, 1.0] \
             and min_cluster_size must be at least 1."
        )
    )]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum InputError {
    #[error("failed to read input file: {path}")]
    #[diagnostic(
        code(homography::input::read),
        help("Ensure the agent results file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not a JSON array of agent results: {message}")]
    #[diagnostic(
        code(homography::input::json),
        help(
            "The input must be a JSON array whose items are agent result objects. \
             Individual malformed items are skipped, but the top level must parse."
        )
    )]
    Json { message: String },

    #[error("input is not a proof object: {message}")]
    #[diagnostic(
        code(homography::input::proof),
        help(
            "A proof is a JSON object with `conditional` (or `if_then_logic`) and an \
             `examples` array."
        )
    )]
    Proof { message: String },

    #[error("required field `{field}` is missing or empty")]
    #[diagnostic(
        code(homography::input::missing_field),
        help("Agent ids, candidate elements and formal structures must be non-empty strings.")
    )]
    MissingField { field: &'static str },
}

/// Convenience result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
