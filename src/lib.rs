//! Embedding consistency checker.
//!
//! Runs two ONNX exports of the same vision encoder over an identical
//! ordered set of images and reports how closely their embeddings agree,
//! as mean/median/low-percentile statistics over per-image cosine
//! similarity. Built for validating converted (e.g. quantized) exports
//! against their fp32 original before they go anywhere near serving.
//!
//! The pipeline is deliberately sequential: the whole contract is that row
//! `i` of both result matrices was produced by input `i`, and running the
//! backends one after the other over one frozen path list removes every way
//! to break that.

pub mod backend;
pub mod config;
pub mod error;
pub mod inputs;
pub mod preprocess;
pub mod runner;
pub mod stats;

pub use backend::{EmbeddingBackend, OnnxBackend};
pub use config::{BackendSpec, CheckerConfig, ExecutionProvider, RuntimeOptions};
pub use error::CheckError;
pub use inputs::{list_images, select_images};
pub use preprocess::{decode_image, load_batch, normalize_image, prepare_image};
pub use runner::run_backend;
pub use stats::{compare, cosine_similarities, SimilaritySummary};

use tracing::info;

/// Run the full consistency check described by `config`: select the image
/// set once, collect embeddings from the baseline and then the candidate
/// over that identical list, and compare the two result matrices.
///
/// All-or-nothing: any failure along the way aborts the run and no summary
/// is produced.
pub fn run_consistency_check(config: &CheckerConfig) -> Result<SimilaritySummary, CheckError> {
    config.validate()?;
    let paths = select_images(&config.images_dir, config.num_images)?;

    let mut baseline = OnnxBackend::load(&config.baseline, &config.runtime)?;
    let baseline_result = run_backend(&mut baseline, &paths, config.batch_size)?;
    drop(baseline);

    let mut candidate = OnnxBackend::load(&config.candidate, &config.runtime)?;
    let candidate_result = run_backend(&mut candidate, &paths, config.batch_size)?;
    drop(candidate);

    let summary = compare(baseline_result.view(), candidate_result.view())?;
    info!(
        baseline = %config.baseline.label,
        candidate = %config.candidate.label,
        mean = summary.mean,
        p0_1 = summary.p0_1,
        "consistency check complete"
    );
    Ok(summary)
}
