// Paired anonymized/real values of one summary metric

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// Minimum number of values per side
pub const MIN_SAMPLE_SIZE: usize = 2;

/// Values of one metric for one channel across both populations
///
/// The two sides are independent draws and may differ in length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryMetricSample {
    pub anonymized: Vec<f64>,
    pub real: Vec<f64>,
}

impl SummaryMetricSample {
    pub fn new(anonymized: Vec<f64>, real: Vec<f64>) -> Self {
        Self { anonymized, real }
    }

    /// Check size and finiteness of both sides
    pub fn validate(&self) -> Result<()> {
        for (side, values) in [("anonymized", &self.anonymized), ("real", &self.real)] {
            if values.len() < MIN_SAMPLE_SIZE {
                return Err(EvalError::invalid_sample(format!(
                    "{} sample has {} values, need at least {}",
                    side,
                    values.len(),
                    MIN_SAMPLE_SIZE
                )));
            }
            if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
                return Err(EvalError::invalid_sample(format!(
                    "{} sample has a non-finite value at index {}",
                    side, pos
                )));
            }
        }
        Ok(())
    }
}
