//! Type definitions for the loan eligibility pipeline

pub mod application;
pub mod decision;
pub mod record;

pub use application::{ApplicantRecord, LoanApplication};
pub use decision::{DecisionMessage, LoanDecision, PredictionResult};
pub use record::{EncodedRecord, FeatureVector, ScaledFeatureVector};
