//! Loan decision data structures

use crate::error::{ErrorKind, PipelineError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary eligibility decision. Class 1 at training time was "approved".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanDecision {
    Rejected,
    Approved,
}

impl LoanDecision {
    /// Map the classifier's class label to a decision.
    pub fn from_label(label: i64) -> Self {
        if label == 1 {
            LoanDecision::Approved
        } else {
            LoanDecision::Rejected
        }
    }

    /// The class label this decision corresponds to.
    pub fn label(&self) -> i64 {
        match self {
            LoanDecision::Rejected => 0,
            LoanDecision::Approved => 1,
        }
    }
}

/// Result of scoring one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Final decision
    pub decision: LoanDecision,
    /// P(class = 0)
    pub probability_rejected: f64,
    /// P(class = 1)
    pub probability_approved: f64,
}

impl PredictionResult {
    /// Build a result from the classifier's two-class probability vector.
    ///
    /// The decision is derived from the probabilities (approved iff
    /// P(approved) >= 0.5), which is exactly the argmax rule the trained
    /// classifier applies in its own `predict` path.
    pub fn from_probabilities(probabilities: [f64; 2]) -> Self {
        let decision = if probabilities[1] >= 0.5 {
            LoanDecision::Approved
        } else {
            LoanDecision::Rejected
        };

        Self {
            decision,
            probability_rejected: probabilities[0],
            probability_approved: probabilities[1],
        }
    }
}

/// Reply message published for every consumed application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionMessage {
    /// Unique decision identifier
    pub decision_id: String,

    /// Associated application ID
    pub application_id: String,

    /// Scoring outcome
    #[serde(flatten)]
    pub outcome: ScoreOutcome,

    /// Decision generation timestamp
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a scoring attempt: either a prediction or a reported error
/// naming the offending field or category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScoreOutcome {
    Scored {
        decision: LoanDecision,
        probability_rejected: f64,
        probability_approved: f64,
    },
    Failed {
        kind: ErrorKind,
        detail: String,
    },
}

impl DecisionMessage {
    /// Create a reply for a successfully scored application.
    pub fn scored(application_id: String, result: &PredictionResult) -> Self {
        Self {
            decision_id: uuid::Uuid::new_v4().to_string(),
            application_id,
            outcome: ScoreOutcome::Scored {
                decision: result.decision,
                probability_rejected: result.probability_rejected,
                probability_approved: result.probability_approved,
            },
            timestamp: Utc::now(),
        }
    }

    /// Create a reply for a failed scoring attempt.
    pub fn failed(application_id: String, error: &PipelineError) -> Self {
        Self {
            decision_id: uuid::Uuid::new_v4().to_string(),
            application_id,
            outcome: ScoreOutcome::Failed {
                kind: error.kind(),
                detail: error.to_string(),
            },
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_from_label() {
        assert_eq!(LoanDecision::from_label(1), LoanDecision::Approved);
        assert_eq!(LoanDecision::from_label(0), LoanDecision::Rejected);
        assert_eq!(LoanDecision::Approved.label(), 1);
    }

    #[test]
    fn test_result_from_probabilities() {
        let approved = PredictionResult::from_probabilities([0.21, 0.79]);
        assert_eq!(approved.decision, LoanDecision::Approved);
        assert_eq!(approved.probability_approved, 0.79);

        let rejected = PredictionResult::from_probabilities([0.66, 0.34]);
        assert_eq!(rejected.decision, LoanDecision::Rejected);
        assert_eq!(rejected.probability_rejected, 0.66);
    }

    #[test]
    fn test_decision_message_serialization() {
        let result = PredictionResult::from_probabilities([0.3, 0.7]);
        let msg = DecisionMessage::scored("app_123".to_string(), &result);

        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: DecisionMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(msg.application_id, deserialized.application_id);
        assert!(json.contains("\"status\":\"scored\""));
    }

    #[test]
    fn test_failure_message_names_the_field() {
        let err = PipelineError::UnknownCategory {
            field: "Gender",
            label: "Other".to_string(),
        };
        let msg = DecisionMessage::failed("app_456".to_string(), &err);

        match msg.outcome {
            ScoreOutcome::Failed { kind, ref detail } => {
                assert_eq!(kind, ErrorKind::UnknownCategory);
                assert!(detail.contains("Gender"));
            }
            _ => panic!("expected failed outcome"),
        }
    }
}
