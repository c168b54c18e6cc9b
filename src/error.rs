//! Error types for the scoring pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request-level errors produced by the scoring pipeline.
///
/// Every variant is terminal for the request it occurs in: each stage is
/// deterministic given the loaded artifacts, so nothing is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A raw numeric field is outside its declared domain.
    #[error("invalid input for '{field}': {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A categorical label was not part of the fitted encoder vocabulary.
    #[error("unknown category '{label}' for '{field}'")]
    UnknownCategory { field: &'static str, label: String },

    /// The assembled feature columns and the classifier's declared schema
    /// are not in 1:1 correspondence. The pipeline code and the trained
    /// artifacts have drifted apart.
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The classifier call itself failed.
    #[error("classifier inference failed: {0}")]
    Inference(String),
}

impl PipelineError {
    /// Stable kind tag, used in reply messages and metrics labels.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput { .. } => ErrorKind::InvalidInput,
            PipelineError::UnknownCategory { .. } => ErrorKind::UnknownCategory,
            PipelineError::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            PipelineError::Inference(_) => ErrorKind::InferenceFailure,
        }
    }
}

/// Serializable error kind carried in decision replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    UnknownCategory,
    SchemaMismatch,
    InferenceFailure,
}

impl ErrorKind {
    /// Label used for metrics keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::UnknownCategory => "unknown_category",
            ErrorKind::SchemaMismatch => "schema_mismatch",
            ErrorKind::InferenceFailure => "inference_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = PipelineError::UnknownCategory {
            field: "Gender",
            label: "Other".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::UnknownCategory);
        assert!(err.to_string().contains("Gender"));
        assert!(err.to_string().contains("Other"));
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::SchemaMismatch).unwrap();
        assert_eq!(json, "\"schema_mismatch\"");
    }
}
