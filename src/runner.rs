//! Batched collection driver: feed an ordered path list through one backend
//! and accumulate a `(N, D)` result matrix.

use std::path::PathBuf;

use ndarray::{Array, Array2};
use tracing::{debug, info};

use crate::backend::EmbeddingBackend;
use crate::error::CheckError;
use crate::preprocess;

/// Run `backend` over `paths` in contiguous batches of `batch_size` (the
/// last batch may be smaller) and concatenate the embedding batches along
/// the sample axis.
///
/// Batches run strictly sequentially so that row `i` of the result always
/// corresponds to `paths[i]`. Any load or inference failure aborts the whole
/// run; no partial matrix is ever returned.
pub fn run_backend<B: EmbeddingBackend>(
    backend: &mut B,
    paths: &[PathBuf],
    batch_size: usize,
) -> Result<Array2<f32>, CheckError> {
    if batch_size == 0 {
        return Err(CheckError::InvalidConfig(
            "batch_size must be non-zero".into(),
        ));
    }

    info!(
        label = backend.label(),
        inputs = paths.len(),
        batch_size,
        "collecting embeddings"
    );

    let mut storage: Vec<f32> = Vec::new();
    let mut width: Option<usize> = None;
    let mut done = 0usize;

    for chunk in paths.chunks(batch_size) {
        let batch = preprocess::load_batch(chunk)?;
        let embeddings = backend.infer(batch.view())?;

        if embeddings.nrows() != chunk.len() {
            return Err(CheckError::Inference(format!(
                "batch of {} inputs produced {} embedding rows",
                chunk.len(),
                embeddings.nrows()
            )));
        }
        match width {
            None => width = Some(embeddings.ncols()),
            Some(expected) if expected != embeddings.ncols() => {
                return Err(CheckError::Inference(format!(
                    "embedding width changed across batches: {expected} vs {}",
                    embeddings.ncols()
                )));
            }
            Some(_) => {}
        }

        // Row-major extension keeps partition order.
        storage.extend(embeddings.iter().copied());
        done += chunk.len();
        debug!(label = backend.label(), done, total = paths.len(), "batch complete");
    }

    let width = width.unwrap_or(0);
    let result = Array::from_shape_vec((paths.len(), width), storage)
        .map_err(|e| CheckError::Inference(e.to_string()))?;
    info!(
        label = backend.label(),
        rows = result.nrows(),
        dim = result.ncols(),
        "final embeddings collected"
    );
    Ok(result)
}
