use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::CheckError;

/// ONNX Runtime execution target for both backend sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionProvider {
    /// Default CPU provider, always compiled in.
    #[default]
    Cpu,
    /// CUDA provider; requires the `cuda` cargo feature.
    Cuda,
}

impl fmt::Display for ExecutionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionProvider::Cpu => write!(f, "cpu"),
            ExecutionProvider::Cuda => write!(f, "cuda"),
        }
    }
}

/// Session-level ONNX Runtime knobs shared by both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeOptions {
    /// Which execution provider to register on the session.
    pub execution_provider: ExecutionProvider,
    /// Intra-op thread pool size.
    pub intra_threads: usize,
    /// Inter-op thread pool size. Defaults to the intra-op count, matching
    /// the single thread-count knob both sessions were tuned with.
    pub inter_threads: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            execution_provider: ExecutionProvider::Cpu,
            intra_threads: 16,
            inter_threads: 16,
        }
    }
}

/// One candidate backend: a label for logs plus the ONNX file to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSpec {
    /// Friendly label surfaced in logs and error context (e.g. `"baseline"`).
    pub label: String,
    /// Path to the ONNX-serialized model.
    pub model_path: PathBuf,
}

impl BackendSpec {
    pub fn new(label: impl Into<String>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            model_path: model_path.into(),
        }
    }
}

/// Full configuration for one consistency-check run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// The reference export (typically the fp32 original).
    pub baseline: BackendSpec,
    /// The export under test (typically the converted/quantized one).
    pub candidate: BackendSpec,
    /// Directory holding the evaluation images.
    pub images_dir: PathBuf,
    /// How many images to run through both backends.
    pub num_images: usize,
    /// Contiguous batch size; the last batch may be smaller.
    pub batch_size: usize,
    /// Shared session options.
    pub runtime: RuntimeOptions,
}

impl CheckerConfig {
    /// Reject configurations the runner cannot execute.
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.num_images == 0 {
            return Err(CheckError::InvalidConfig(
                "num_images must be non-zero".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(CheckError::InvalidConfig(
                "batch_size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> CheckerConfig {
        CheckerConfig {
            baseline: BackendSpec::new("baseline", "/models/fp32.onnx"),
            candidate: BackendSpec::new("candidate", "/models/int8.onnx"),
            images_dir: PathBuf::from("/data/images"),
            num_images: 128,
            batch_size: 16,
            runtime: RuntimeOptions::default(),
        }
    }

    #[test]
    fn runtime_defaults() {
        let runtime = RuntimeOptions::default();
        assert_eq!(runtime.execution_provider, ExecutionProvider::Cpu);
        assert_eq!(runtime.intra_threads, 16);
        assert_eq!(runtime.inter_threads, 16);
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn zero_num_images_rejected() {
        let cfg = CheckerConfig {
            num_images: 0,
            ..sample_config()
        };
        assert!(matches!(cfg.validate(), Err(CheckError::InvalidConfig(_))));
    }

    #[test]
    fn zero_batch_size_rejected() {
        let cfg = CheckerConfig {
            batch_size: 0,
            ..sample_config()
        };
        assert!(matches!(cfg.validate(), Err(CheckError::InvalidConfig(_))));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = CheckerConfig {
            runtime: RuntimeOptions {
                execution_provider: ExecutionProvider::Cuda,
                intra_threads: 8,
                inter_threads: 4,
            },
            ..sample_config()
        };
        let serialized = serde_json::to_string(&cfg).unwrap();
        let deserialized: CheckerConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }

    #[test]
    fn provider_serializes_lowercase() {
        let json = serde_json::to_string(&ExecutionProvider::Cuda).unwrap();
        assert_eq!(json, "\"cuda\"");
    }
}
