//! Pre-fitted artifacts: encoders, scaler and the trained classifier

pub mod classifier;
pub mod encoder;
pub mod loader;
pub mod scaler;

pub use classifier::{Classifier, OnnxClassifier};
pub use encoder::EncoderSet;
pub use loader::{ArtifactBundle, ArtifactLoader};
pub use scaler::StandardScaler;
