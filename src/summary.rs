//! Descriptive statistics per record and channel
//!
//! Each record contributes one value per (channel, metric) to its
//! population's column; the anonymized and real columns of the same
//! (channel, metric) form the [`SummaryMetricSample`] handed to the
//! distribution tests.

use crate::channel::{Channel, Metric};
use crate::compare::SummaryMetricSample;
use crate::error::{ErrorContext, EvalError, Result};
use crate::record::MultivariateRecord;
use statrs::statistics::{Data, Median, Statistics};
use std::collections::BTreeMap;

/// The five summary metrics of one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub mean: f64,
    /// Sample standard deviation (divisor n - 1)
    pub std: f64,
    /// Middle value, or mean of the two middle values for even lengths
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesSummary {
    /// Summarize one series
    ///
    /// # Errors
    /// `InvalidSample` if the series has fewer than two samples (no sample
    /// standard deviation) or a non-finite sample.
    pub fn of(samples: &[f64]) -> Result<Self> {
        if samples.len() < 2 {
            return Err(EvalError::invalid_sample(format!(
                "series has {} samples, need at least 2 for a standard deviation",
                samples.len()
            )));
        }
        if let Some(pos) = samples.iter().position(|v| !v.is_finite()) {
            return Err(EvalError::invalid_sample(format!(
                "series has a non-finite sample at index {}",
                pos
            )));
        }

        Ok(Self {
            mean: samples.iter().mean(),
            std: samples.iter().std_dev(),
            median: Data::new(samples.to_vec()).median(),
            min: Statistics::min(samples.iter()),
            max: Statistics::max(samples.iter()),
        })
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mean => self.mean,
            Metric::Std => self.std,
            Metric::Median => self.median,
            Metric::Min => self.min,
            Metric::Max => self.max,
        }
    }
}

/// Per (channel, metric) samples for both populations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    samples: BTreeMap<(Channel, Metric), SummaryMetricSample>,
}

impl SummaryTable {
    /// Summarize every record of both populations on `channels`
    ///
    /// Column order follows record order, so row `i` of the anonymized
    /// column belongs to the `i`-th anonymized record.
    pub fn build(
        real: &[MultivariateRecord],
        anonymized: &[MultivariateRecord],
        channels: &[Channel],
    ) -> Result<Self> {
        let mut samples: BTreeMap<(Channel, Metric), SummaryMetricSample> = BTreeMap::new();

        for &channel in channels {
            for (records, is_anonymized) in [(anonymized, true), (real, false)] {
                for record in records {
                    let summary = SeriesSummary::of(record.channel(channel).samples())
                        .map_err(|e| {
                            e.with_context(ErrorContext::record(record.id()).with_channel(channel))
                        })?;

                    for metric in Metric::ALL {
                        let entry = samples.entry((channel, metric)).or_default();
                        let column = if is_anonymized {
                            &mut entry.anonymized
                        } else {
                            &mut entry.real
                        };
                        column.push(summary.get(metric));
                    }
                }
            }
        }

        tracing::info!(
            channels = channels.len(),
            real = real.len(),
            anonymized = anonymized.len(),
            "summary metrics extracted"
        );

        Ok(Self { samples })
    }

    pub fn get(&self, channel: Channel, metric: Metric) -> Option<&SummaryMetricSample> {
        self.samples.get(&(channel, metric))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate `(channel, metric, sample)` in channel then metric order
    pub fn iter(&self) -> impl Iterator<Item = (Channel, Metric, &SummaryMetricSample)> {
        self.samples.iter().map(|(&(c, m), s)| (c, m, s))
    }

    /// Consume the table into battery input
    pub fn into_samples(self) -> Vec<(Channel, Metric, SummaryMetricSample)> {
        self.samples
            .into_iter()
            .map(|((c, m), s)| (c, m, s))
            .collect()
    }
}
