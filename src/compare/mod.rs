// Two-sample distribution comparison of summary metrics
//
// For every (channel, metric, parameter setting) the anonymized and real
// values of one summary metric are compared with two independent tests:
//
// - two-sided two-sample Kolmogorov-Smirnov (equality of distributions)
// - two-sided Mann-Whitney U for independent samples (location shift)
//
// The samples come from two independently drawn populations, so the rank
// test is always the unpaired one. Each tuple is a separate failable unit:
// one failing metric never hides the results of the others.
//
// Scientific Foundation:
// [1] Hodges, J. L. (1958). The significance probability of the Smirnov
//     two-sample test. Arkiv för Matematik 3, 469-486.
// [2] Mann, H. B., & Whitney, D. R. (1947). On a test of whether one of two
//     random variables is stochastically larger than the other. Annals of
//     Mathematical Statistics 18, 50-60.

mod battery;
mod ks;
mod mann_whitney;
mod sample;

pub use battery::{run_battery, ComparisonBattery, ComparisonKey, ComparisonOutcome};
pub use ks::{ks_2samp, ks_statistic};
pub use mann_whitney::mann_whitney_u;
pub use sample::SummaryMetricSample;

use crate::error::Result;
use serde::Serialize;

/// Statistic and two-sided p-value of one hypothesis test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// Both tests for one summary metric sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub ks: TestResult,
    pub mann_whitney: TestResult,
}

/// Run the KS and Mann-Whitney tests on one sample pair
///
/// # Errors
/// `InvalidSample` when a side has fewer than two values or a non-finite
/// value; `StatisticalTest` when a test is undefined for the data.
///
/// # Example
/// ```
/// use anonym_eval::compare::{compare_samples, SummaryMetricSample};
///
/// let sample = SummaryMetricSample::new(
///     vec![1.0, 2.0, 3.0, 4.0, 5.0],
///     vec![1.0, 2.0, 3.0, 4.0, 5.0],
/// );
/// let result = compare_samples(&sample).unwrap();
/// assert_eq!(result.ks.statistic, 0.0);
/// assert_eq!(result.ks.p_value, 1.0);
/// assert_eq!(result.mann_whitney.statistic, 12.5);
/// assert_eq!(result.mann_whitney.p_value, 1.0);
/// ```
pub fn compare_samples(sample: &SummaryMetricSample) -> Result<ComparisonResult> {
    sample.validate()?;

    let ks = ks_2samp(&sample.anonymized, &sample.real)?;
    let mann_whitney = mann_whitney_u(&sample.anonymized, &sample.real)?;

    Ok(ComparisonResult { ks, mann_whitney })
}
