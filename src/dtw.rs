//! Dynamic time warping distance between two sequences
//!
//! Full cumulative-cost matrix, no window or band constraint:
//!
//! ```text
//! cell(i, j) = cost(x_i, y_j) + min(cell(i-1, j), cell(i, j-1), cell(i-1, j-1))
//! ```
//!
//! with the first row and column holding cumulative sums. Only two rows of
//! the matrix are kept alive, sized to the shorter sequence, so memory is
//! O(min(n, m)) while time stays O(n * m).
//!
//! DTW is a pseudo-metric: identity and symmetry hold, the triangle
//! inequality does not.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// Pointwise cost accumulated along the warping path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DtwCost {
    /// `|x - y|`, result is the accumulated sum
    #[default]
    Absolute,
    /// `(x - y)^2`, result is the square root of the accumulated sum
    Euclidean,
}

impl DtwCost {
    #[inline]
    fn pointwise(self, x: f64, y: f64) -> f64 {
        match self {
            DtwCost::Absolute => (x - y).abs(),
            DtwCost::Euclidean => (x - y) * (x - y),
        }
    }

    #[inline]
    fn finish(self, accumulated: f64) -> f64 {
        match self {
            DtwCost::Absolute => accumulated,
            DtwCost::Euclidean => accumulated.sqrt(),
        }
    }
}

/// DTW distance calculator
///
/// # Example
/// ```
/// use anonym_eval::dtw::SequenceDistance;
///
/// let dtw = SequenceDistance::default();
/// assert_eq!(dtw.distance(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0]).unwrap(), 3.0);
/// assert_eq!(dtw.distance(&[1.0, 2.0, 3.0], &[1.0, 2.0, 2.0, 3.0]).unwrap(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceDistance {
    cost: DtwCost,
}

impl SequenceDistance {
    pub fn new(cost: DtwCost) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> DtwCost {
        self.cost
    }

    /// Compute the DTW distance between `x` and `y`
    ///
    /// # Errors
    /// `InvalidInput` if either sequence is empty or holds a non-finite
    /// sample, or if the accumulated cost overflows.
    pub fn distance(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        check_sequence(x, "first")?;
        check_sequence(y, "second")?;

        // Rows walk the longer sequence so the rolling buffers stay short.
        // Transposing the matrix leaves every cell value unchanged.
        let (rows, cols) = if x.len() >= y.len() { (x, y) } else { (y, x) };
        let width = cols.len();

        let mut prev = vec![0.0_f64; width];
        let mut curr = vec![0.0_f64; width];

        let mut running = 0.0;
        for (cell, &c) in prev.iter_mut().zip(cols) {
            running += self.cost.pointwise(rows[0], c);
            *cell = running;
        }

        for &r in &rows[1..] {
            curr[0] = prev[0] + self.cost.pointwise(r, cols[0]);
            for j in 1..width {
                let best = prev[j].min(curr[j - 1]).min(prev[j - 1]);
                curr[j] = self.cost.pointwise(r, cols[j]) + best;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        let distance = self.cost.finish(prev[width - 1]);
        if !distance.is_finite() {
            return Err(EvalError::invalid_input(
                "accumulated warping cost is not finite",
            ));
        }
        Ok(distance)
    }
}

/// DTW distance with the default absolute-difference cost
pub fn dtw_distance(x: &[f64], y: &[f64]) -> Result<f64> {
    SequenceDistance::default().distance(x, y)
}

fn check_sequence(seq: &[f64], which: &str) -> Result<()> {
    if seq.is_empty() {
        return Err(EvalError::invalid_input(format!(
            "{} sequence is empty",
            which
        )));
    }
    if let Some(pos) = seq.iter().position(|v| !v.is_finite()) {
        return Err(EvalError::invalid_input(format!(
            "{} sequence has a non-finite sample at index {}",
            which, pos
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_sequences_zero() {
        assert_eq!(dtw_distance(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_constant_offset() {
        // Every aligned pair costs 1, no cheaper alignment exists
        assert_eq!(dtw_distance(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_shifted_sequence() {
        // Matrix worked by hand: last cell is 2
        assert_eq!(dtw_distance(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_unequal_lengths_warp_to_zero() {
        let short = [1.0, 2.0, 3.0];
        let long = [1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
        assert_eq!(dtw_distance(&short, &long).unwrap(), 0.0);
        assert_eq!(dtw_distance(&long, &short).unwrap(), 0.0);
    }

    #[test]
    fn test_single_element_sequences() {
        assert_eq!(dtw_distance(&[5.0], &[2.0]).unwrap(), 3.0);
        // One sample against many: every sample aligns to the single one
        assert_eq!(dtw_distance(&[0.0], &[1.0, 2.0, 3.0]).unwrap(), 6.0);
    }

    #[test]
    fn test_symmetric_on_unequal_lengths() {
        let a = [72.0, 75.0, 71.0, 90.0, 88.0];
        let b = [70.0, 91.0, 86.0];
        assert_eq!(dtw_distance(&a, &b).unwrap(), dtw_distance(&b, &a).unwrap());
    }

    #[test]
    fn test_euclidean_cost() {
        let dtw = SequenceDistance::new(DtwCost::Euclidean);
        let d = dtw.distance(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0]).unwrap();
        assert!((d - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let err = dtw_distance(&[], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidInput { .. }));

        let err = dtw_distance(&[1.0], &[]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidInput { .. }));
    }

    #[test]
    fn test_nan_sample_rejected() {
        let err = dtw_distance(&[1.0, f64::NAN], &[1.0]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidInput { .. }));
        assert!(err.to_string().contains("index 1"));
    }
}
