// GestLock — Similarity Engine
//
// Two interchangeable metrics compare an enrolled template with a fresh
// candidate:
//   * DTW distance over Euclidean per-sample cost (lower is closer).
//   * Per-axis Pearson correlation after zero-padding the shorter series
//     (higher is closer).
// Either metric reports "could not compare" as an `Err`, never as a low score.

use thiserror::Error;

use super::{Axis, GestureSequence, Sample3};
use crate::config::*;

/// Reasons two series could not be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimilarityError {
    #[error("cannot compare an empty series")]
    EmptySeries,
    #[error("series lengths differ after padding ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
}

// ---------------------------------------------------------------------------
// Dynamic time warping
// ---------------------------------------------------------------------------

/// Classic DTW alignment cost between two sample sequences.
///
/// Only two rows of the cost matrix are kept; each cell is computed with the
/// same recurrence and operand order as the full matrix, so the result is
/// identical.
pub fn dtw_distance(s: &[Sample3], t: &[Sample3]) -> Result<f32, SimilarityError> {
    if s.is_empty() || t.is_empty() {
        return Err(SimilarityError::EmptySeries);
    }

    let m = t.len();
    let mut prev = vec![f32::INFINITY; m + 1];
    let mut cur = vec![f32::INFINITY; m + 1];
    prev[0] = 0.0;

    for si in s {
        cur[0] = f32::INFINITY;
        for j in 1..=m {
            let best = prev[j].min(cur[j - 1]).min(prev[j - 1]);
            cur[j] = si.distance(&t[j - 1]) + best;
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    Ok(prev[m])
}

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// Pearson correlation of two scalar series.
///
/// The shorter series is right-padded with zeros; the longer one is never
/// truncated. A zero-variance series has no linear association and yields
/// 0.0, except that two identical series count as a perfect match (1.0). So a
/// single-sample gesture matches only an identical single-sample gesture.
pub fn pearson(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.is_empty() || b.is_empty() {
        return Err(SimilarityError::EmptySeries);
    }

    let n = a.len().max(b.len());
    let a = zero_padded(a, n);
    let b = zero_padded(b, n);
    if a.len() != b.len() {
        return Err(SimilarityError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (mut sa, mut sb, mut sab, mut saa, mut sbb) = (0.0f64, 0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        sa += x;
        sb += y;
        sab += x * y;
        saa += x * x;
        sbb += y * y;
    }

    let n = n as f64;
    let numerator = n * sab - sa * sb;
    let denominator = ((n * saa - sa * sa) * (n * sbb - sb * sb)).sqrt();
    if !(denominator > 0.0) {
        return Ok(if a == b { 1.0 } else { 0.0 });
    }

    Ok((numerator / denominator).clamp(-1.0, 1.0) as f32)
}

fn zero_padded(series: &[f32], len: usize) -> Vec<f32> {
    let mut padded = Vec::with_capacity(len.max(series.len()));
    padded.extend_from_slice(series);
    padded.resize(len.max(series.len()), 0.0);
    padded
}

/// Per-axis correlation coefficients, ordered x, y, z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisCorrelation {
    pub coefficients: [f32; 3],
}

impl AxisCorrelation {
    /// Number of axes whose coefficient is strictly above `threshold`.
    pub fn passing(&self, threshold: f32) -> usize {
        self.coefficients.iter().filter(|&&c| c > threshold).count()
    }
}

/// Correlate each axis of two gestures.
pub fn correlate(
    template: &GestureSequence,
    candidate: &GestureSequence,
) -> Result<AxisCorrelation, SimilarityError> {
    let mut coefficients = [0.0f32; 3];
    for (slot, axis) in coefficients.iter_mut().zip(Axis::ALL) {
        *slot = pearson(&template.axis(axis), &candidate.axis(axis))?;
    }
    Ok(AxisCorrelation { coefficients })
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Which metric decides and where its cut-off lies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchPolicy {
    /// Accept when at least `min_axes` axes correlate above `threshold`.
    Correlation { threshold: f32, min_axes: usize },
    /// Accept when the DTW distance is below `threshold`.
    Dtw { threshold: f32 },
}

impl MatchPolicy {
    /// DTW policy at the stock distance cut-off.
    pub fn dtw() -> Self {
        MatchPolicy::Dtw {
            threshold: DTW_THRESHOLD,
        }
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy::Correlation {
            threshold: CORRELATION_THRESHOLD,
            min_axes: CORRELATION_MIN_AXES,
        }
    }
}

/// Raw score behind a decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Correlation([f32; 3]),
    Distance(f32),
}

/// Outcome of a completed comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub accepted: bool,
    pub score: Score,
}

/// Compare two gestures under `policy`.
pub fn compare(
    template: &GestureSequence,
    candidate: &GestureSequence,
    policy: &MatchPolicy,
) -> Result<Decision, SimilarityError> {
    match *policy {
        MatchPolicy::Correlation { threshold, min_axes } => {
            let corr = correlate(template, candidate)?;
            let required = min_axes.clamp(1, 3);
            Ok(Decision {
                accepted: corr.passing(threshold) >= required,
                score: Score::Correlation(corr.coefficients),
            })
        }
        MatchPolicy::Dtw { threshold } => {
            let distance = dtw_distance(template.as_slice(), candidate.as_slice())?;
            Ok(Decision {
                accepted: distance < threshold,
                score: Score::Distance(distance),
            })
        }
    }
}
