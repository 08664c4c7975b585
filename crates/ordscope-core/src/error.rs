//! # Error Hierarchy
//!
//! Structured error types for every ordscope subsystem, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Judge failures are never swallowed: they surface through
//! [`ClassifierError::Judge`] or [`GraphError::Judge`] unchanged, and retry
//! policy belongs to whoever supplied the judge.

use thiserror::Error;

/// Top-level error type for ordscope.
#[derive(Error, Debug)]
pub enum OrdscopeError {
    /// A judge call failed.
    #[error("judge error: {0}")]
    Judge(#[from] JudgeError),

    /// Jurisdiction fields are inconsistent with the declared type.
    #[error("jurisdiction error: {0}")]
    Jurisdiction(#[from] JurisdictionError),

    /// Chunk classification or scanning failed.
    #[error("classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Verification graph compilation or traversal failed.
    #[error("verification graph error: {0}")]
    Graph(#[from] GraphError),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Failure reported by a judge (the pluggable yes/no decision function).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JudgeError {
    /// The judge could not produce an answer.
    #[error("judge failed: {0}")]
    Failed(String),

    /// The judge answered, but the answer could not be interpreted.
    #[error("malformed judge response: {0}")]
    MalformedResponse(String),

    /// The transport behind the judge (model service, network) failed.
    #[error("judge transport failure: {0}")]
    Transport(String),
}

/// Jurisdiction values whose tier fields do not match the declared type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JurisdictionError {
    /// The state name is empty or whitespace-only.
    #[error("jurisdiction state name must be non-empty")]
    EmptyState,

    /// A county-tier jurisdiction was declared without a county name.
    #[error("jurisdiction of type \"{jurisdiction_type}\" requires a county name")]
    MissingCounty {
        /// The declared jurisdiction type.
        jurisdiction_type: String,
    },

    /// A county name was given for a type that has no county tier.
    #[error("jurisdiction of type \"{jurisdiction_type}\" cannot carry a county name (got \"{county}\")")]
    UnexpectedCounty {
        /// The declared jurisdiction type.
        jurisdiction_type: String,
        /// The rejected county name.
        county: String,
    },

    /// A subdivision-tier jurisdiction was declared without a subdivision name.
    #[error("jurisdiction of type \"{jurisdiction_type}\" requires a subdivision name")]
    MissingSubdivision {
        /// The declared jurisdiction type.
        jurisdiction_type: String,
    },

    /// A subdivision name was given for a type above the subdivision tier.
    #[error("jurisdiction of type \"{jurisdiction_type}\" cannot carry a subdivision name (got \"{subdivision}\")")]
    UnexpectedSubdivision {
        /// The declared jurisdiction type.
        jurisdiction_type: String,
        /// The rejected subdivision name.
        subdivision: String,
    },

    /// The jurisdiction type string is not recognized.
    #[error("unknown jurisdiction type: \"{0}\"")]
    UnknownType(String),
}

/// Errors from the windowed classifier and the scan orchestrator.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The requested chunk index lies outside the chunk store.
    #[error("chunk index {index} out of range for {len} chunk(s)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of chunks in the store.
        len: usize,
    },

    /// The recall window must cover at least the queried chunk.
    #[error("recall window size must be at least 1")]
    EmptyRecallWindow,

    /// A validator outcome may only be written once per document.
    #[error("outcome for \"{key}\" was already resolved")]
    OutcomeAlreadyResolved {
        /// The validator's question key.
        key: String,
    },

    /// The judge failed while resolving a window position.
    #[error("judge failed at chunk {index} for \"{key}\": {source}")]
    Judge {
        /// The chunk index being judged.
        index: usize,
        /// The question key being judged.
        key: String,
        /// The underlying judge failure.
        #[source]
        source: JudgeError,
    },
}

/// Errors from verification graph compilation and traversal.
#[derive(Error, Debug)]
pub enum GraphError {
    /// The jurisdiction cannot be compiled into a graph.
    #[error("cannot compile graph: {0}")]
    Jurisdiction(#[from] JurisdictionError),

    /// The graph violates a structural invariant (cycle, dangling edge,
    /// unreachable node, missing or duplicate terminal).
    #[error("malformed verification graph: {0}")]
    Malformed(String),

    /// An edge or lookup referenced a node that does not exist.
    #[error("unknown graph node: \"{0}\"")]
    UnknownNode(String),

    /// Traversal visited more nodes than the graph contains.
    #[error("traversal exceeded {limit} step(s) without reaching the terminal node")]
    StepLimitExceeded {
        /// The step budget (number of nodes in the graph).
        limit: usize,
    },

    /// The judge failed while answering a node.
    #[error("judge failed at node \"{node}\": {source}")]
    Judge {
        /// The node being answered.
        node: String,
        /// The underlying judge failure.
        #[source]
        source: JudgeError,
    },
}

/// Errors loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// YAML parse failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judge_error_display() {
        let err = JudgeError::Failed("rate limited".to_string());
        assert!(format!("{err}").contains("rate limited"));
    }

    #[test]
    fn jurisdiction_error_missing_county_names_type() {
        let err = JurisdictionError::MissingCounty {
            jurisdiction_type: "parish".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("parish"));
        assert!(msg.contains("county name"));
    }

    #[test]
    fn classifier_error_index_out_of_range_display() {
        let err = ClassifierError::IndexOutOfRange { index: 9, len: 7 };
        let msg = format!("{err}");
        assert!(msg.contains('9'));
        assert!(msg.contains('7'));
    }

    #[test]
    fn classifier_error_judge_keeps_source() {
        let err = ClassifierError::Judge {
            index: 3,
            key: "legal_text".to_string(),
            source: JudgeError::Transport("timeout".to_string()),
        };
        let msg = format!("{err}");
        assert!(msg.contains("legal_text"));
        assert!(msg.contains("timeout"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn graph_error_from_jurisdiction() {
        let err: GraphError = JurisdictionError::EmptyState.into();
        assert!(matches!(err, GraphError::Jurisdiction(_)));
        assert!(format!("{err}").contains("non-empty"));
    }

    #[test]
    fn top_level_wraps_subsystems() {
        let e1: OrdscopeError = JudgeError::Failed("x".into()).into();
        let e2: OrdscopeError = ConfigError::Invalid("num_to_recall".into()).into();
        let e3: OrdscopeError = GraphError::UnknownNode("is_state".into()).into();
        assert!(format!("{e1}").starts_with("judge error"));
        assert!(format!("{e2}").contains("num_to_recall"));
        assert!(format!("{e3}").contains("is_state"));
    }
}
