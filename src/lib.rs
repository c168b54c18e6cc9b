//! Loan Eligibility Pipeline Library
//!
//! Scores loan applications with a previously trained binary classifier,
//! reproducing the exact categorical encoding, feature engineering,
//! standardization and column ordering the model was trained with.

pub mod artifacts;
pub mod config;
pub mod consumer;
pub mod error;
pub mod features;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod producer;
pub mod types;

pub use artifacts::{ArtifactBundle, ArtifactLoader, Classifier};
pub use config::AppConfig;
pub use consumer::ApplicationConsumer;
pub use error::{ErrorKind, PipelineError};
pub use features::FeatureEngineer;
pub use pipeline::ScoringPipeline;
pub use producer::DecisionProducer;
pub use types::{DecisionMessage, LoanApplication, LoanDecision, PredictionResult};
