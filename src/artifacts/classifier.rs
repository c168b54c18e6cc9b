//! Trained classifier artifact and its ONNX-backed implementation.

use crate::error::PipelineError;
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Capability interface for the trained binary classifier.
///
/// The pipeline depends only on this interface, so tests run against
/// fixture implementations instead of a real model artifact.
pub trait Classifier: Send + Sync {
    /// The ordered feature schema the classifier was trained on.
    fn feature_names(&self) -> &[String];

    /// Class probabilities `[P(class 0), P(class 1)]` for one aligned
    /// feature vector.
    fn predict_proba(&self, features: &[f32]) -> Result<[f64; 2], PipelineError>;

    /// Class label for one aligned feature vector. The default derives it
    /// from the probability vector with the classifier's own argmax rule.
    fn predict(&self, features: &[f32]) -> Result<i64, PipelineError> {
        let probabilities = self.predict_proba(features)?;
        Ok(if probabilities[1] >= 0.5 { 1 } else { 0 })
    }
}

/// Classifier backed by an ONNX export of the trained model.
pub struct OnnxClassifier {
    /// ONNX Runtime session. Running a session takes `&mut`, so calls are
    /// serialized behind the lock; everything else here is read-only.
    session: Mutex<Session>,
    /// Input name for the model
    input_name: String,
    /// Output name for probabilities
    output_name: String,
    /// Declared feature schema, from the model's metadata sidecar
    feature_names: Vec<String>,
}

impl OnnxClassifier {
    /// Load the model from an ONNX file.
    ///
    /// `feature_names` is the ordered schema recorded at export time
    /// (`feature_names_in_` of the trained estimator).
    pub fn load<P: AsRef<Path>>(
        path: P,
        feature_names: Vec<String>,
        onnx_threads: usize,
    ) -> Result<Self> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = onnx_threads, "Loading ONNX classifier");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load classifier from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            input = %input_name,
            output = %output_name,
            features = feature_names.len(),
            "Classifier loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            feature_names,
        })
    }

    /// Extract the two-class probability vector from the session outputs.
    ///
    /// Handles both tensor outputs and the seq(map) layout sklearn's ONNX
    /// exporter emits for its tree ensembles.
    fn extract_probabilities(
        &self,
        outputs: &ort::session::SessionOutputs,
    ) -> Result<[f64; 2], PipelineError> {
        if let Some(output) = outputs.get(&self.output_name) {
            if let Some(probabilities) = Self::try_from_output(output)? {
                return Ok(probabilities);
            }
        }

        // The probabilities output may be named differently than what was
        // discovered at load time; try the remaining outputs, skipping the
        // label output.
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }
            if let Some(probabilities) = Self::try_from_output(output)? {
                debug!(output = %name, "Extracted probabilities from fallback output");
                return Ok(probabilities);
            }
        }

        Err(PipelineError::Inference(
            "no probability output in a recognized layout".to_string(),
        ))
    }

    fn try_from_output(output: &ort::value::DynValue) -> Result<Option<[f64; 2]>, PipelineError> {
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            return Ok(Some(Self::from_tensor(&shape, data)?));
        }

        let dtype = output.dtype();
        if DynSequenceValueType::can_downcast(&dtype) {
            return Ok(Some(Self::from_sequence_map(output)?));
        }

        Ok(None)
    }

    /// Probabilities from a `[batch, num_classes]` tensor.
    fn from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> Result<[f64; 2], PipelineError> {
        let dims: Vec<i64> = shape.iter().copied().collect();
        let num_classes = match dims.as_slice() {
            [_, n] => *n as usize,
            [n] => *n as usize,
            _ => 0,
        };

        match num_classes {
            2 if data.len() >= 2 => Ok([data[0] as f64, data[1] as f64]),
            // Single-column output carries P(class 1)
            1 if !data.is_empty() => Ok([1.0 - data[0] as f64, data[0] as f64]),
            _ => Err(PipelineError::Inference(format!(
                "unexpected probability tensor shape {dims:?}"
            ))),
        }
    }

    /// Probabilities from the seq(map(int64, float)) layout.
    fn from_sequence_map(output: &ort::value::DynValue) -> Result<[f64; 2], PipelineError> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| PipelineError::Inference(format!("not a sequence output: {e}")))?;

        let maps = sequence
            .try_extract_sequence::<DynMapValueType>(&allocator)
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        let map_value = maps
            .first()
            .ok_or_else(|| PipelineError::Inference("empty probability sequence".to_string()))?;

        let kv_pairs = map_value
            .try_extract_key_values::<i64, f32>()
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        let mut p0 = None;
        let mut p1 = None;
        for (class_id, prob) in &kv_pairs {
            match *class_id {
                0 => p0 = Some(*prob as f64),
                1 => p1 = Some(*prob as f64),
                _ => {}
            }
        }

        match (p0, p1) {
            (Some(p0), Some(p1)) => Ok([p0, p1]),
            (None, Some(p1)) => Ok([1.0 - p1, p1]),
            (Some(p0), None) => Ok([p0, 1.0 - p0]),
            (None, None) => Err(PipelineError::Inference(
                "no class probabilities in map output".to_string(),
            )),
        }
    }
}

impl Classifier for OnnxClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &[f32]) -> Result<[f64; 2], PipelineError> {
        use ort::value::Tensor;

        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .map_err(|e| PipelineError::Inference(format!("input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| PipelineError::Inference(format!("session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        self.extract_probabilities(&outputs)
    }
}
