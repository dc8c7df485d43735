//! Embedding consistency checker CLI.
//!
//! ```bash
//! embcheck \
//!     --baseline-onnx models/vision-fp32.onnx \
//!     --candidate-onnx models/vision-int8.onnx \
//!     --images-dir data/eval-images \
//!     --num-images 1024 --batch-size 32 \
//!     --execution-provider cpu
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use embcheck::{
    run_consistency_check, BackendSpec, CheckerConfig, ExecutionProvider, RuntimeOptions,
};

/// Compare two ONNX vision-encoder exports over the same images.
#[derive(Parser, Debug)]
#[command(name = "embcheck")]
#[command(about = "Report cosine-similarity statistics between two ONNX exports")]
struct Args {
    /// Path to the reference export (typically the fp32 original)
    #[arg(long)]
    baseline_onnx: PathBuf,

    /// Path to the export under test (typically the converted one)
    #[arg(long)]
    candidate_onnx: PathBuf,

    /// Directory with the evaluation images
    #[arg(long)]
    images_dir: PathBuf,

    /// How many images to run through both backends
    #[arg(long)]
    num_images: usize,

    /// Batch size; the last batch may be smaller
    #[arg(long)]
    batch_size: usize,

    /// Execution provider for both sessions
    #[arg(long, value_enum, default_value_t = ExecutionProvider::Cpu)]
    execution_provider: ExecutionProvider,

    /// ONNX Runtime thread-pool size (intra- and inter-op)
    #[arg(long, default_value_t = 16)]
    intra_threads: usize,

    /// Emit the summary as JSON instead of one line per statistic
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = CheckerConfig {
        baseline: BackendSpec::new("baseline", args.baseline_onnx),
        candidate: BackendSpec::new("candidate", args.candidate_onnx),
        images_dir: args.images_dir,
        num_images: args.num_images,
        batch_size: args.batch_size,
        runtime: RuntimeOptions {
            execution_provider: args.execution_provider,
            intra_threads: args.intra_threads,
            inter_threads: args.intra_threads,
        },
    };

    let summary = run_consistency_check(&config).context("consistency check failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}
