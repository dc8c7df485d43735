use std::io;
use thiserror::Error;

/// Errors surfaced by the consistency-check pipeline.
///
/// Only two failure kinds are recognized as boundary conditions of the
/// checker itself: [`CheckError::InsufficientInputs`] and
/// [`CheckError::ShapeMismatch`]. Everything else (decode failures, I/O,
/// ONNX Runtime errors) propagates unmodified — a single failed batch aborts
/// the whole run rather than producing a partial, misleading summary.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The ONNX model file does not exist at the configured path.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The image directory holds fewer usable files than the requested count.
    #[error("requested {requested} images, but found only {available} in {dir}")]
    InsufficientInputs {
        requested: usize,
        available: usize,
        dir: String,
    },
    /// The two backends produced embedding matrices of different shapes;
    /// cosine similarity is undefined across mismatched dimensions.
    #[error("embedding shapes disagree: {left_rows}x{left_dim} vs {right_rows}x{right_dim}")]
    ShapeMismatch {
        left_rows: usize,
        left_dim: usize,
        right_rows: usize,
        right_dim: usize,
    },
    /// An input image could not be decoded.
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    /// Low-level IO failures while scanning the image directory or reading files.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// ONNX Runtime session build or invocation errors.
    #[error("onnx runtime failure: {0}")]
    Session(#[from] ort::Error),
    /// The model ran but returned something the checker cannot use
    /// (wrong rank, inconsistent row width, missing output).
    #[error("inference failure: {0}")]
    Inference(String),
    /// Configuration is inconsistent (e.g., a zero batch size).
    #[error("invalid checker config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_model_not_found() {
        let err = CheckError::ModelNotFound("/path/to/model.onnx".into());
        assert!(err.to_string().contains("model file not found"));
        assert!(err.to_string().contains("/path/to/model.onnx"));
    }

    #[test]
    fn error_insufficient_inputs_names_counts_and_dir() {
        let err = CheckError::InsufficientInputs {
            requested: 5,
            available: 3,
            dir: "/data/images".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("requested 5 images"));
        assert!(msg.contains("found only 3"));
        assert!(msg.contains("/data/images"));
    }

    #[test]
    fn error_shape_mismatch_names_both_shapes() {
        let err = CheckError::ShapeMismatch {
            left_rows: 10,
            left_dim: 768,
            right_rows: 10,
            right_dim: 512,
        };
        let msg = err.to_string();
        assert!(msg.contains("10x768"));
        assert!(msg.contains("10x512"));
    }

    #[test]
    fn error_inference() {
        let err = CheckError::Inference("model returned no outputs".into());
        assert!(err.to_string().contains("inference failure"));
        assert!(err.to_string().contains("model returned no outputs"));
    }

    #[test]
    fn error_invalid_config() {
        let err = CheckError::InvalidConfig("batch_size must be non-zero".into());
        assert!(err.to_string().contains("invalid checker config"));
    }

    #[test]
    fn error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: CheckError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }

    #[test]
    fn error_debug_formatting() {
        let err = CheckError::ModelNotFound("test.onnx".into());
        let debug_str = format!("{err:?}");
        assert!(debug_str.contains("ModelNotFound"));
        assert!(debug_str.contains("test.onnx"));
    }
}
