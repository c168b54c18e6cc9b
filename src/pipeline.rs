//! The scoring pipeline.
//!
//! One linear flow per application, mirroring the training-time
//! preprocessing exactly:
//!
//! `Raw -> Normalize -> Encode -> Engineer -> Scale+Align -> Classify`
//!
//! Every stage is deterministic and pure given the loaded artifacts, so a
//! failed request is never retried.

use crate::artifacts::ArtifactBundle;
use crate::error::PipelineError;
use crate::features::FeatureEngineer;
use crate::normalize;
use crate::types::record::ScaledFeatureVector;
use crate::types::{LoanApplication, PredictionResult};
use std::collections::HashSet;
use tracing::debug;

/// Scores loan applications against the pre-fitted artifact bundle.
///
/// The bundle is loaded once and injected here; the pipeline itself keeps
/// no per-request state.
pub struct ScoringPipeline {
    artifacts: ArtifactBundle,
    engineer: FeatureEngineer,
}

impl ScoringPipeline {
    /// Create a pipeline over a loaded artifact bundle.
    pub fn new(artifacts: ArtifactBundle) -> Self {
        Self {
            artifacts,
            engineer: FeatureEngineer::new(),
        }
    }

    /// Score one application.
    pub fn score(&self, application: &LoanApplication) -> Result<PredictionResult, PipelineError> {
        let record = normalize::normalize(application)?;
        let encoded = self.artifacts.encoders.encode(&record)?;
        let features = self.engineer.engineer(encoded);
        let scaled = self.artifacts.scaler.transform(&features);
        let aligned = self.align(&scaled)?;

        let probabilities = self.artifacts.classifier.predict_proba(&aligned)?;
        let result = PredictionResult::from_probabilities(probabilities);

        debug!(
            application_id = %application.application_id,
            decision = ?result.decision,
            probability_approved = result.probability_approved,
            "Application scored"
        );

        Ok(result)
    }

    /// Emit the scaled columns in the exact order the classifier declares.
    ///
    /// The classifier identifies features positionally once past this
    /// boundary, so the declared schema and the available columns must be
    /// in 1:1 correspondence; nothing is dropped or zero-filled.
    fn align(&self, scaled: &ScaledFeatureVector) -> Result<Vec<f32>, PipelineError> {
        let names = self.artifacts.classifier.feature_names();

        if names.len() != ScaledFeatureVector::COLUMN_COUNT {
            return Err(PipelineError::SchemaMismatch(format!(
                "classifier declares {} features, pipeline produces {}",
                names.len(),
                ScaledFeatureVector::COLUMN_COUNT
            )));
        }

        let mut seen = HashSet::with_capacity(names.len());
        let mut aligned = Vec::with_capacity(names.len());
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::SchemaMismatch(format!(
                    "classifier schema declares '{name}' more than once"
                )));
            }
            let value = scaled.column(name).ok_or_else(|| {
                PipelineError::SchemaMismatch(format!(
                    "classifier expects unknown column '{name}'"
                ))
            })?;
            aligned.push(value as f32);
        }

        Ok(aligned)
    }

    /// Number of features the loaded classifier expects.
    pub fn feature_count(&self) -> usize {
        self.artifacts.classifier.feature_names().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{Classifier, EncoderSet, StandardScaler};
    use crate::error::PipelineError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Classifier fixture with a fixed probability vector and a call
    /// counter.
    struct FixtureClassifier {
        feature_names: Vec<String>,
        probabilities: [f64; 2],
        calls: Arc<AtomicUsize>,
    }

    impl Classifier for FixtureClassifier {
        fn feature_names(&self) -> &[String] {
            &self.feature_names
        }

        fn predict_proba(&self, features: &[f32]) -> Result<[f64; 2], PipelineError> {
            assert_eq!(features.len(), self.feature_names.len());
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.probabilities)
        }
    }

    fn fitted_classes() -> HashMap<String, Vec<String>> {
        let mut classes = HashMap::new();
        for (field, labels) in [
            ("Gender", vec!["Female", "Male"]),
            ("Married", vec!["No", "Yes"]),
            ("Dependents", vec!["0", "1", "2", "3+"]),
            ("Education", vec!["Graduate", "Not Graduate"]),
            ("Self_Employed", vec!["No", "Yes"]),
            ("Property_Area", vec!["Rural", "Semiurban", "Urban"]),
        ] {
            classes.insert(
                field.to_string(),
                labels.into_iter().map(String::from).collect(),
            );
        }
        classes
    }

    fn identity_scaler() -> StandardScaler {
        serde_json::from_str(
            r#"{
                "columns": ["ApplicantIncome", "CoapplicantIncome", "LoanAmount", "Loan_Amount_Term", "Credit_History"],
                "mean": [0.0, 0.0, 0.0, 0.0, 0.0],
                "scale": [1.0, 1.0, 1.0, 1.0, 1.0]
            }"#,
        )
        .unwrap()
    }

    fn training_schema() -> Vec<String> {
        ScaledFeatureVector::column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn pipeline_with(
        feature_names: Vec<String>,
        probabilities: [f64; 2],
    ) -> (ScoringPipeline, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let bundle = ArtifactBundle {
            encoders: EncoderSet::from_classes(fitted_classes()).unwrap(),
            scaler: identity_scaler(),
            classifier: Box::new(FixtureClassifier {
                feature_names,
                probabilities,
                calls: calls.clone(),
            }),
        };
        (ScoringPipeline::new(bundle), calls)
    }

    #[test]
    fn test_scoring_happy_path() {
        let (pipeline, calls) = pipeline_with(training_schema(), [0.34, 0.66]);
        let app = LoanApplication::sample("app_1".to_string());

        let result = pipeline.score(&app).unwrap();

        assert_eq!(result.decision, crate::types::LoanDecision::Approved);
        assert!((result.probability_rejected + result.probability_approved - 1.0).abs() < 1e-6);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_decision_consistent_with_probabilities() {
        let (approving, _) = pipeline_with(training_schema(), [0.4, 0.6]);
        let (rejecting, _) = pipeline_with(training_schema(), [0.6, 0.4]);
        let app = LoanApplication::sample("app_1".to_string());

        let approved = approving.score(&app).unwrap();
        assert_eq!(
            approved.decision == crate::types::LoanDecision::Approved,
            approved.probability_approved >= 0.5
        );

        let rejected = rejecting.score(&app).unwrap();
        assert_eq!(
            rejected.decision == crate::types::LoanDecision::Approved,
            rejected.probability_approved >= 0.5
        );
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let (pipeline, _) = pipeline_with(training_schema(), [0.25, 0.75]);
        let app = LoanApplication::sample("app_1".to_string());

        let first = pipeline.score(&app).unwrap();
        let second = pipeline.score(&app).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_key_order_does_not_matter() {
        let (pipeline, _) = pipeline_with(training_schema(), [0.25, 0.75]);

        let forward: LoanApplication = serde_json::from_str(
            r#"{
                "application_id": "app_1", "gender": "Male", "married": "Yes",
                "dependents": "0", "education": "Graduate", "self_employed": "No",
                "applicant_income": 6000, "coapplicant_income": 2000,
                "loan_amount": 180, "loan_term_days": 360,
                "credit_history": 1.0, "property_area": "Urban"
            }"#,
        )
        .unwrap();
        let shuffled: LoanApplication = serde_json::from_str(
            r#"{
                "property_area": "Urban", "credit_history": 1.0,
                "loan_term_days": 360, "loan_amount": 180,
                "coapplicant_income": 2000, "applicant_income": 6000,
                "self_employed": "No", "education": "Graduate",
                "dependents": "0", "married": "Yes", "gender": "Male",
                "application_id": "app_1"
            }"#,
        )
        .unwrap();

        assert_eq!(
            pipeline.score(&forward).unwrap(),
            pipeline.score(&shuffled).unwrap()
        );
    }

    #[test]
    fn test_aligner_follows_classifier_order() {
        // A schema in reversed order must still resolve every column.
        let mut reversed = training_schema();
        reversed.reverse();
        let (pipeline, calls) = pipeline_with(reversed, [0.5, 0.5]);

        let app = LoanApplication::sample("app_1".to_string());
        assert!(pipeline.score(&app).is_ok());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unknown_category_stops_before_classifier() {
        let (pipeline, calls) = pipeline_with(training_schema(), [0.25, 0.75]);
        let mut app = LoanApplication::sample("app_1".to_string());
        app.gender = "Other".to_string();

        match pipeline.score(&app).unwrap_err() {
            PipelineError::UnknownCategory { field, label } => {
                assert_eq!(field, "Gender");
                assert_eq!(label, "Other");
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_invalid_input_stops_before_classifier() {
        let (pipeline, calls) = pipeline_with(training_schema(), [0.25, 0.75]);
        let mut app = LoanApplication::sample("app_1".to_string());
        app.loan_amount = -5.0;

        assert!(matches!(
            pipeline.score(&app).unwrap_err(),
            PipelineError::InvalidInput { .. }
        ));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_schema_with_unknown_column_is_rejected() {
        let mut schema = training_schema();
        schema[12] = "Loan_to_Value".to_string();
        let (pipeline, calls) = pipeline_with(schema, [0.5, 0.5]);

        let app = LoanApplication::sample("app_1".to_string());
        match pipeline.score(&app).unwrap_err() {
            PipelineError::SchemaMismatch(detail) => assert!(detail.contains("Loan_to_Value")),
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_schema_with_wrong_count_is_rejected() {
        let mut schema = training_schema();
        schema.pop();
        let (pipeline, _) = pipeline_with(schema, [0.5, 0.5]);

        let app = LoanApplication::sample("app_1".to_string());
        assert!(matches!(
            pipeline.score(&app).unwrap_err(),
            PipelineError::SchemaMismatch(_)
        ));
    }

    #[test]
    fn test_schema_with_duplicate_column_is_rejected() {
        let mut schema = training_schema();
        schema[12] = schema[0].clone();
        let (pipeline, _) = pipeline_with(schema, [0.5, 0.5]);

        let app = LoanApplication::sample("app_1".to_string());
        assert!(matches!(
            pipeline.score(&app).unwrap_err(),
            PipelineError::SchemaMismatch(_)
        ));
    }

    #[test]
    fn test_zero_income_scenario() {
        let (pipeline, _) = pipeline_with(training_schema(), [0.7, 0.3]);
        let mut app = LoanApplication::sample("app_1".to_string());
        app.applicant_income = 0.0;
        app.coapplicant_income = 0.0;

        // total income 0, ratio 180 / 1 = 180: must score, not NaN out
        let result = pipeline.score(&app).unwrap();
        assert_eq!(result.decision, crate::types::LoanDecision::Rejected);
    }
}
