//! Inference backends. The runner only sees [`EmbeddingBackend`]; the ONNX
//! Runtime session lives behind it so tests can drive the batching logic
//! with deterministic stand-ins.

use ndarray::{ArrayView4, Ix2};
use ort::execution_providers::CPUExecutionProvider;
#[cfg(feature = "cuda")]
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::config::{BackendSpec, ExecutionProvider, RuntimeOptions};
use crate::error::CheckError;

/// A model-inference execution target: a batch of prepared inputs in, one
/// fixed-width embedding row per input out.
pub trait EmbeddingBackend {
    /// Label used in logs and error context.
    fn label(&self) -> &str;

    /// Map a `(B, 3, 256, 256)` batch to a `(B, D)` embedding matrix.
    /// Row order must match batch order.
    fn infer(&mut self, batch: ArrayView4<'_, f32>) -> Result<ndarray::Array2<f32>, CheckError>;
}

/// An ONNX-serialized export running under ONNX Runtime.
pub struct OnnxBackend {
    label: String,
    session: Session,
    input_name: String,
    output_name: String,
}

impl OnnxBackend {
    /// Build a session for `spec` with the shared runtime options: full graph
    /// optimization, configured thread pools, memory pattern enabled, and the
    /// selected execution provider.
    pub fn load(spec: &BackendSpec, runtime: &RuntimeOptions) -> Result<Self, CheckError> {
        if !spec.model_path.is_file() {
            return Err(CheckError::ModelNotFound(
                spec.model_path.display().to_string(),
            ));
        }

        let builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(runtime.intra_threads)?
            .with_inter_threads(runtime.inter_threads)?
            .with_memory_pattern(true)?;
        let builder = match runtime.execution_provider {
            ExecutionProvider::Cpu => {
                builder.with_execution_providers([CPUExecutionProvider::default().build()])?
            }
            #[cfg(feature = "cuda")]
            ExecutionProvider::Cuda => {
                builder.with_execution_providers([CUDAExecutionProvider::default().build()])?
            }
            #[cfg(not(feature = "cuda"))]
            ExecutionProvider::Cuda => {
                return Err(CheckError::InvalidConfig(
                    "cuda execution provider requested but the `cuda` feature is not compiled in"
                        .into(),
                ))
            }
        };
        let session = builder.commit_from_file(&spec.model_path)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| CheckError::Inference("model declares no inputs".into()))?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| CheckError::Inference("model declares no outputs".into()))?;

        info!(
            label = %spec.label,
            model = %spec.model_path.display(),
            input = %input_name,
            output = %output_name,
            "onnx session ready"
        );

        Ok(Self {
            label: spec.label.clone(),
            session,
            input_name,
            output_name,
        })
    }
}

impl EmbeddingBackend for OnnxBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn infer(&mut self, batch: ArrayView4<'_, f32>) -> Result<ndarray::Array2<f32>, CheckError> {
        let rows = batch.dim().0;
        let tensor = Tensor::from_array(batch.to_owned())?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])?;

        let value = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            CheckError::Inference(format!(
                "model produced no output named '{}'",
                self.output_name
            ))
        })?;
        let embeddings = value.try_extract_array::<f32>()?;
        let shape = embeddings.shape().to_vec();
        let embeddings = embeddings.into_dimensionality::<Ix2>().map_err(|_| {
            CheckError::Inference(format!(
                "expected a (batch, dim) embedding matrix, got shape {shape:?}"
            ))
        })?;

        if embeddings.nrows() != rows {
            return Err(CheckError::Inference(format!(
                "fed {rows} inputs but model returned {} embedding rows",
                embeddings.nrows()
            )));
        }

        Ok(embeddings.to_owned())
    }
}
