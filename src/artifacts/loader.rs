//! One-time loading of the pre-fitted artifacts.

use crate::artifacts::classifier::{Classifier, OnnxClassifier};
use crate::artifacts::encoder::EncoderSet;
use crate::artifacts::scaler::StandardScaler;
use crate::config::ArtifactsConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Metadata sidecar exported next to the ONNX model at training time.
#[derive(Debug, Deserialize)]
struct ModelMeta {
    /// `feature_names_in_` of the trained estimator, in training order
    feature_names: Vec<String>,
}

/// The three pre-fitted artifacts, loaded once at process start and shared
/// read-only for the process lifetime.
pub struct ArtifactBundle {
    pub encoders: EncoderSet,
    pub scaler: StandardScaler,
    pub classifier: Box<dyn Classifier>,
}

/// Loader for the artifact bundle.
pub struct ArtifactLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ArtifactLoader {
    /// Create a new loader with default settings (1 inference thread).
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new loader with the given ONNX thread count.
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        // Initialize ONNX Runtime
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load every artifact named in the configuration.
    pub fn load(&self, config: &ArtifactsConfig) -> Result<ArtifactBundle> {
        let encoders = self
            .load_encoders(&config.encoders_path)
            .with_context(|| format!("Failed to load encoders from {}", config.encoders_path))?;

        let scaler = self
            .load_scaler(&config.scaler_path)
            .with_context(|| format!("Failed to load scaler from {}", config.scaler_path))?;

        let meta: ModelMeta = read_json(&config.model_meta_path).with_context(|| {
            format!("Failed to load model metadata from {}", config.model_meta_path)
        })?;
        if meta.feature_names.is_empty() {
            anyhow::bail!("model metadata declares an empty feature schema");
        }

        let classifier =
            OnnxClassifier::load(&config.model_path, meta.feature_names, self.onnx_threads)?;

        info!(
            model = %config.model_path,
            features = classifier.feature_names().len(),
            "Artifact bundle loaded"
        );

        Ok(ArtifactBundle {
            encoders,
            scaler,
            classifier: Box::new(classifier),
        })
    }

    /// Load the per-field label encoders.
    pub fn load_encoders<P: AsRef<Path>>(&self, path: P) -> Result<EncoderSet> {
        let classes: HashMap<String, Vec<String>> = read_json(path)?;
        EncoderSet::from_classes(classes)
    }

    /// Load and validate the standard scaler.
    pub fn load_scaler<P: AsRef<Path>>(&self, path: P) -> Result<StandardScaler> {
        let scaler: StandardScaler = read_json(path)?;
        scaler.validate()?;
        Ok(scaler)
    }
}

fn read_json<T: serde::de::DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_artifact(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_load_encoders_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(
            &dir,
            "encoders.json",
            r#"{
                "Gender": ["Female", "Male"],
                "Married": ["No", "Yes"],
                "Dependents": ["0", "1", "2", "3+"],
                "Education": ["Graduate", "Not Graduate"],
                "Self_Employed": ["No", "Yes"],
                "Property_Area": ["Rural", "Semiurban", "Urban"]
            }"#,
        );

        let loader = ArtifactLoader { onnx_threads: 1 };
        assert!(loader.load_encoders(&path).is_ok());
    }

    #[test]
    fn test_load_scaler_rejects_bad_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(
            &dir,
            "scaler.json",
            r#"{
                "columns": ["ApplicantIncome", "CoapplicantIncome", "LoanAmount", "Loan_Amount_Term", "Credit_History"],
                "mean": [5400.0, 1600.0, 146.0],
                "scale": [6100.0, 2900.0, 85.0, 65.0, 0.36]
            }"#,
        );

        let loader = ArtifactLoader { onnx_threads: 1 };
        assert!(loader.load_scaler(&path).is_err());
    }

    #[test]
    fn test_missing_artifact_is_an_error() {
        let loader = ArtifactLoader { onnx_threads: 1 };
        assert!(loader.load_encoders("does/not/exist.json").is_err());
    }
}
