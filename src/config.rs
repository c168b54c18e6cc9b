//! Configuration management for the loan eligibility pipeline

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub artifacts: ArtifactsConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming loan applications
    pub application_subject: String,
    /// Subject for outgoing decisions
    pub decision_subject: String,
}

/// Pre-fitted artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// ONNX export of the trained classifier
    pub model_path: String,
    /// JSON sidecar with the classifier's declared feature schema
    pub model_meta_path: String,
    /// JSON artifact with the fitted scaler statistics
    pub scaler_path: String,
    /// JSON artifact with the fitted per-field encoder vocabularies
    pub encoders_path: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of worker tasks scoring applications concurrently
    pub workers: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                application_subject: "loan.applications".to_string(),
                decision_subject: "loan.decisions".to_string(),
            },
            artifacts: ArtifactsConfig {
                model_path: "artifacts/rf_model.onnx".to_string(),
                model_meta_path: "artifacts/rf_model.json".to_string(),
                scaler_path: "artifacts/scaler.json".to_string(),
                encoders_path: "artifacts/encoders.json".to_string(),
                onnx_threads: 1,
            },
            pipeline: PipelineConfig { workers: 4 },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.nats.application_subject, "loan.applications");
        assert_eq!(config.artifacts.onnx_threads, 1);
        assert_eq!(config.pipeline.workers, 4);
    }
}
