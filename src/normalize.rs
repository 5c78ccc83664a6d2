//! Z-score normalization of minimum distances
//!
//! `z = (d - mean) / s` where `s` is the Bessel-corrected sample standard
//! deviation of the whole population. The barrier is structural: the
//! function takes the complete population as a slice, and the scorer only
//! releases one once every record is scored.

use crate::error::{EvalError, Result};
use statrs::statistics::Statistics;

/// Mean and sample standard deviation used for a normalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl NormalizationStats {
    /// Z-score of one distance
    pub fn z_score(&self, distance: f64) -> f64 {
        (distance - self.mean) / self.std_dev
    }

    /// Z-scores of `distances`, in input order
    pub fn apply(&self, distances: &[f64]) -> Vec<f64> {
        distances.iter().map(|&d| self.z_score(d)).collect()
    }
}

/// Compute the population statistics, enforcing the preconditions
///
/// # Errors
/// - `InsufficientSample` when fewer than two distances are given
/// - `InvalidInput` when a distance is not finite
/// - `DegenerateDistribution` when every distance is identical
pub fn population_stats(distances: &[f64]) -> Result<NormalizationStats> {
    if distances.len() < 2 {
        return Err(EvalError::InsufficientSample {
            required: 2,
            actual: distances.len(),
        });
    }

    if let Some(pos) = distances.iter().position(|d| !d.is_finite()) {
        return Err(EvalError::invalid_input(format!(
            "minimum distance at position {} is not finite",
            pos
        )));
    }

    let first = distances[0];
    if distances.iter().all(|&d| d == first) {
        return Err(EvalError::DegenerateDistribution {
            count: distances.len(),
            value: first,
        });
    }

    let mean = distances.iter().mean();
    let std_dev = distances.iter().std_dev();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return Err(EvalError::DegenerateDistribution {
            count: distances.len(),
            value: mean,
        });
    }

    Ok(NormalizationStats {
        count: distances.len(),
        mean,
        std_dev,
    })
}

/// Normalize minimum distances into dissimilarity z-scores
///
/// Output order matches input order.
///
/// # Example
/// ```
/// use anonym_eval::normalize::normalize;
///
/// let z = normalize(&[1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(z, vec![-1.0, 0.0, 1.0]);
/// ```
pub fn normalize(distances: &[f64]) -> Result<Vec<f64>> {
    let stats = population_stats(distances)?;

    tracing::debug!(
        count = stats.count,
        mean = stats.mean,
        std_dev = stats.std_dev,
        "normalizing minimum distances"
    );

    Ok(stats.apply(distances))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mean_std(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var.sqrt())
    }

    #[test]
    fn test_known_values() {
        // mean 5, sample std sqrt(32/7)
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = population_stats(&data).unwrap();
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);

        let z = normalize(&data).unwrap();
        assert!((z[0] - (-3.0 / stats.std_dev)).abs() < 1e-12);
    }

    #[test]
    fn test_stats_apply_matches_normalize() {
        let data = [12.5, 3.25, 8.0, 40.1];
        let stats = population_stats(&data).unwrap();
        assert_eq!(stats.apply(&data), normalize(&data).unwrap());
        assert_eq!(stats.z_score(stats.mean), 0.0);
        assert!((stats.z_score(stats.mean + stats.std_dev) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_output_is_standardized() {
        let data = [12.5, 3.25, 8.0, 40.1, 17.7, 9.9];
        let z = normalize(&data).unwrap();
        let (mean, std) = sample_mean_std(&z);
        assert!(mean.abs() < 1e-12);
        assert!((std - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_order_preserved() {
        let data = [30.0, 10.0, 20.0];
        let z = normalize(&data).unwrap();
        assert!(z[0] > z[2] && z[2] > z[1]);
    }

    #[test]
    fn test_renormalizing_is_idempotent() {
        let data = [4.2, 1.7, 9.3, 6.6, 2.8];
        let once = normalize(&data).unwrap();
        let twice = normalize(&once).unwrap();
        for (a, b) in once.iter().zip(&twice) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_two_values_map_to_plus_minus() {
        let z = normalize(&[3.0, 5.0]).unwrap();
        let half_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
        assert!((z[0] + half_sqrt2).abs() < 1e-12);
        assert!((z[1] - half_sqrt2).abs() < 1e-12);
    }

    #[test]
    fn test_single_value_rejected() {
        let err = normalize(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            EvalError::InsufficientSample {
                required: 2,
                actual: 1
            }
        ));
        assert!(normalize(&[]).is_err());
    }

    #[test]
    fn test_identical_values_rejected() {
        let err = normalize(&[0.1, 0.1, 0.1]).unwrap_err();
        assert!(matches!(err, EvalError::DegenerateDistribution { count: 3, .. }));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = normalize(&[1.0, f64::NAN, 2.0]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidInput { .. }));
    }
}
