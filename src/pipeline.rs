//! End-to-end evaluation stages over in-memory populations
//!
//! - [`score_population`]: nearest-neighbor DTW scoring, then z-score
//!   normalization once every record is scored
//! - [`describe_populations`]: summary metrics per record and channel
//! - [`compare_populations`]: summary metrics, then the distribution tests
//!   for every (channel, metric) of the configured channels

use crate::compare::{run_battery, ComparisonBattery};
use crate::config::EvalConfig;
use crate::error::Result;
use crate::normalize::{population_stats, NormalizationStats};
use crate::record::MultivariateRecord;
use crate::scoring::{NearestNeighborScorer, NeighborScore};
use crate::setting::ParameterSetting;
use crate::summary::SummaryTable;

/// Outcome of dissimilarity scoring for one anonymized population
#[derive(Debug, Clone)]
pub struct DissimilarityReport {
    /// Seed actually used, so an entropy-seeded run can be replayed
    pub seed: u64,
    /// Per-record scores in population order
    pub scores: Vec<NeighborScore>,
    /// Statistics of the minimum distances used for normalization
    pub stats: NormalizationStats,
    /// Normalized dissimilarity per anonymized record, population order
    pub dissimilarities: Vec<f64>,
}

impl DissimilarityReport {
    pub fn minimum_distances(&self) -> Vec<f64> {
        self.scores.iter().map(|s| s.minimum).collect()
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();
        report.push_str("Dissimilarity scores\n");
        report.push_str(&format!("Seed: {}\n", self.seed));
        report.push_str(&format!(
            "Records: {}  mean minimum distance: {:.6}  std: {:.6}\n\n",
            self.stats.count, self.stats.mean, self.stats.std_dev
        ));
        report.push_str(&format!(
            "  {:<24} {:<24} {:>14} {:>12}\n",
            "record", "nearest", "min_distance", "dissim_norm"
        ));

        for (score, z) in self.scores.iter().zip(&self.dissimilarities) {
            let nearest = score
                .nearest_candidate()
                .map(|c| c.reference_id.as_str())
                .unwrap_or("-");
            report.push_str(&format!(
                "  {:<24} {:<24} {:>14.6} {:>12.6}\n",
                score.record_id, nearest, score.minimum, z
            ));
        }

        report
    }
}

/// Score every anonymized record against the real pool and normalize
///
/// # Errors
/// `InsufficientPool` when the real pool is smaller than the sample size,
/// any DTW failure of a record, and the normalization preconditions
/// (`InsufficientSample`, `DegenerateDistribution`).
pub fn score_population(
    real: &[MultivariateRecord],
    anonymized: &[MultivariateRecord],
    config: &EvalConfig,
) -> Result<DissimilarityReport> {
    config.validate()?;
    let seed = config.seed.resolve();

    let scorer = NearestNeighborScorer::from_config(real, config, seed)?;
    let scores = scorer.score_population(anonymized)?;

    let minimums: Vec<f64> = scores.iter().map(|s| s.minimum).collect();
    let stats = population_stats(&minimums)?;
    let dissimilarities = stats.apply(&minimums);

    tracing::info!(
        seed,
        records = scores.len(),
        mean = stats.mean,
        std_dev = stats.std_dev,
        "dissimilarity scoring complete"
    );

    Ok(DissimilarityReport {
        seed,
        scores,
        stats,
        dissimilarities,
    })
}

/// Summary metrics of both populations on the configured channels
pub fn describe_populations(
    real: &[MultivariateRecord],
    anonymized: &[MultivariateRecord],
    config: &EvalConfig,
) -> Result<SummaryTable> {
    config.validate()?;
    SummaryTable::build(real, anonymized, &config.channels)
}

/// Compare the summary-metric distributions of both populations
///
/// Summary extraction errors are fatal. Test failures are recorded per
/// (channel, metric) in the returned battery.
pub fn compare_populations(
    real: &[MultivariateRecord],
    anonymized: &[MultivariateRecord],
    setting: &ParameterSetting,
    config: &EvalConfig,
) -> Result<ComparisonBattery> {
    let table = describe_populations(real, anonymized, config)?;
    let battery = run_battery(table.into_samples(), setting);

    tracing::info!(
        setting = %setting,
        comparisons = battery.len(),
        failed = battery.failures().count(),
        "distribution comparison complete"
    );

    Ok(battery)
}
