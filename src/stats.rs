//! Distributional similarity between two backend run results.
//!
//! Each row pair is reduced to a cosine similarity; the N cosines are then
//! summarized by mean, median, and the lowest-tail percentiles. The tail is
//! what matters here: a quantized export that agrees on average but falls
//! apart on one image in a thousand shows up in p0_1 long before it moves
//! the mean.

use std::fmt;

use ndarray::ArrayView2;
use serde::Serialize;

use crate::error::CheckError;

/// Denominator guard so all-zero rows divide cleanly instead of producing NaN.
const NORM_EPSILON: f32 = 1e-12;

/// Named statistics over the per-input cosine similarities of one comparison.
/// Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilaritySummary {
    pub mean: f64,
    pub median: f64,
    /// 5th percentile.
    pub p5: f64,
    /// 2.5th percentile.
    pub p2_5: f64,
    /// 1st percentile.
    pub p1: f64,
    /// 0.1st percentile.
    pub p0_1: f64,
}

impl SimilaritySummary {
    /// Statistics in report order.
    pub fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("mean", self.mean),
            ("median", self.median),
            ("p5", self.p5),
            ("p2_5", self.p2_5),
            ("p1", self.p1),
            ("p0_1", self.p0_1),
        ]
    }
}

impl fmt::Display for SimilaritySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.named() {
            writeln!(f, "{name}: {value:.6}")?;
        }
        Ok(())
    }
}

/// Per-row cosine similarity between two equal-shaped matrices.
///
/// Both rows are L2-normalized with [`NORM_EPSILON`] added to the
/// denominator, then dotted; each value lands in [-1, 1]. Symmetric in its
/// arguments.
pub fn cosine_similarities(
    a: ArrayView2<'_, f32>,
    b: ArrayView2<'_, f32>,
) -> Result<Vec<f32>, CheckError> {
    if a.dim() != b.dim() {
        return Err(CheckError::ShapeMismatch {
            left_rows: a.nrows(),
            left_dim: a.ncols(),
            right_rows: b.nrows(),
            right_dim: b.ncols(),
        });
    }

    let mut cosines = Vec::with_capacity(a.nrows());
    for (row_a, row_b) in a.rows().into_iter().zip(b.rows()) {
        let norm_a = row_a.iter().map(|x| x * x).sum::<f32>().sqrt() + NORM_EPSILON;
        let norm_b = row_b.iter().map(|x| x * x).sum::<f32>().sqrt() + NORM_EPSILON;
        let dot = row_a
            .iter()
            .zip(row_b.iter())
            .map(|(x, y)| x * y)
            .sum::<f32>();
        cosines.push(dot / (norm_a * norm_b));
    }
    Ok(cosines)
}

/// Compare two backend run results and summarize their agreement.
///
/// Fails with [`CheckError::ShapeMismatch`] before computing anything when
/// the shapes disagree. Degenerate distributions do not fail: the percentile
/// of a single value is that value.
pub fn compare(
    a: ArrayView2<'_, f32>,
    b: ArrayView2<'_, f32>,
) -> Result<SimilaritySummary, CheckError> {
    let cosines = cosine_similarities(a, b)?;
    Ok(summarize(&cosines))
}

/// Aggregate a cosine distribution into the named statistics.
pub fn summarize(cosines: &[f32]) -> SimilaritySummary {
    let mut sorted: Vec<f64> = cosines.iter().map(|&c| c as f64).collect();
    sorted.sort_by(|x, y| x.total_cmp(y));

    let mean = if sorted.is_empty() {
        f64::NAN
    } else {
        sorted.iter().sum::<f64>() / sorted.len() as f64
    };

    SimilaritySummary {
        mean,
        median: percentile(&sorted, 50.0),
        p5: percentile(&sorted, 5.0),
        p2_5: percentile(&sorted, 2.5),
        p1: percentile(&sorted, 1.0),
        p0_1: percentile(&sorted, 0.1),
    }
}

/// Percentile of an ascending-sorted slice, `q` in percent, with linear
/// interpolation between closest ranks. A single-element slice returns that
/// element for any `q`.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = q / 100.0 * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            if lo == hi {
                sorted[lo]
            } else {
                let weight = rank - lo as f64;
                sorted[lo] * (1.0 - weight) + sorted[hi] * weight
            }
        }
    }
}
