//! anonym-eval - Evaluation of anonymized physiological time series
//!
//! This library scores how far each anonymized patient record sits from the
//! real population (nearest-neighbor multivariate DTW, then z-score
//! normalization), and compares the distributions of per-record summary
//! metrics between the two populations with the Kolmogorov-Smirnov and
//! Mann-Whitney U tests.

pub mod channel;
pub mod cli;
pub mod compare;
pub mod config;
pub mod dtw;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod scoring;
pub mod setting;
pub mod summary;
pub mod writer;

pub use error::{EvalError, Result};
