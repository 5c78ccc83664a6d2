// Nearest-neighbor scorer over a pool of real records

use crate::channel::Channel;
use crate::config::EvalConfig;
use crate::dtw::{DtwCost, SequenceDistance};
use crate::error::{ErrorContext, EvalError, Result};
use crate::record::MultivariateRecord;
use crate::scoring::accumulator::ScoreAccumulator;
use crate::scoring::sampler::{record_seed, sample_references};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

/// One sampled real record and its distance to the anonymized record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub reference_id: String,
    /// DTW distance per channel, in [`Channel::ALL`] order
    pub channel_distances: [f64; Channel::COUNT],
    /// Mean of the channel distances
    pub distance: f64,
}

/// Scoring outcome for one anonymized record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborScore {
    pub record_id: String,
    /// Candidates in sampling order
    pub candidates: Vec<Candidate>,
    /// Smallest candidate distance
    pub minimum: f64,
    /// Position of the first candidate achieving `minimum`
    pub nearest: usize,
}

impl NeighborScore {
    pub fn nearest_candidate(&self) -> Option<&Candidate> {
        self.candidates.get(self.nearest)
    }
}

/// Mean of the four channel DTW distances between two records
pub fn multivariate_distance(
    distance: &SequenceDistance,
    anonymized: &MultivariateRecord,
    reference: &MultivariateRecord,
) -> Result<Candidate> {
    let mut channel_distances = [0.0; Channel::COUNT];

    for channel in Channel::ALL {
        let d = distance
            .distance(
                anonymized.channel(channel).samples(),
                reference.channel(channel).samples(),
            )
            .map_err(|e| {
                e.with_context(
                    ErrorContext::record(format!("{} vs {}", anonymized.id(), reference.id()))
                        .with_channel(channel),
                )
            })?;
        channel_distances[channel.index()] = d;
    }

    let distance = channel_distances.iter().sum::<f64>() / Channel::COUNT as f64;

    Ok(Candidate {
        reference_id: reference.id().to_string(),
        channel_distances,
        distance,
    })
}

/// Scores anonymized records against random subsets of a real pool
///
/// # Example
/// ```
/// use anonym_eval::record::{MultivariateRecord, Origin};
/// use anonym_eval::scoring::NearestNeighborScorer;
///
/// let real: Vec<_> = (0..3)
///     .map(|i| {
///         let v = vec![i as f64; 5];
///         MultivariateRecord::from_samples(i.to_string(), Origin::Real, v.clone(), v.clone(), v.clone(), v)
///     })
///     .collect();
/// let anon = MultivariateRecord::from_samples(
///     "a", Origin::Anonymized, vec![0.0; 5], vec![0.0; 5], vec![0.0; 5], vec![0.0; 5],
/// );
///
/// let scorer = NearestNeighborScorer::new(&real, 3, 42).unwrap();
/// let score = scorer.score_at(0, &anon).unwrap();
/// assert_eq!(score.minimum, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct NearestNeighborScorer<'a> {
    pool: &'a [MultivariateRecord],
    sample_size: usize,
    seed: u64,
    distance: SequenceDistance,
    parallel: bool,
}

impl<'a> NearestNeighborScorer<'a> {
    /// Scorer drawing `sample_size` references per record from `pool`
    ///
    /// # Errors
    /// `InsufficientPool` if the pool holds fewer than `sample_size` records,
    /// `InvalidConfig` if `sample_size` is zero.
    pub fn new(pool: &'a [MultivariateRecord], sample_size: usize, seed: u64) -> Result<Self> {
        if sample_size == 0 {
            return Err(EvalError::InvalidConfig(
                "sample_size must be >= 1".to_string(),
            ));
        }
        if pool.len() < sample_size {
            return Err(EvalError::InsufficientPool {
                required: sample_size,
                actual: pool.len(),
            });
        }

        Ok(Self {
            pool,
            sample_size,
            seed,
            distance: SequenceDistance::default(),
            parallel: false,
        })
    }

    /// Scorer configured from an [`EvalConfig`] and an already resolved seed
    pub fn from_config(pool: &'a [MultivariateRecord], config: &EvalConfig, seed: u64) -> Result<Self> {
        Ok(Self::new(pool, config.sample_size, seed)?
            .with_cost(config.dtw_cost)
            .with_parallel(config.parallel))
    }

    pub fn with_cost(mut self, cost: DtwCost) -> Self {
        self.distance = SequenceDistance::new(cost);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Score one record with a caller-supplied generator
    pub fn score_record<R: Rng + ?Sized>(
        &self,
        record: &MultivariateRecord,
        rng: &mut R,
    ) -> Result<NeighborScore> {
        let picks = sample_references(rng, self.pool.len(), self.sample_size)?;

        let mut candidates = Vec::with_capacity(picks.len());
        let mut nearest = 0;
        let mut minimum = f64::INFINITY;

        for (position, &pick) in picks.iter().enumerate() {
            let candidate = multivariate_distance(&self.distance, record, &self.pool[pick])?;
            // Strict comparison keeps the first candidate among equals
            if candidate.distance < minimum {
                minimum = candidate.distance;
                nearest = position;
            }
            candidates.push(candidate);
        }

        tracing::debug!(
            record = record.id(),
            minimum,
            nearest = candidates[nearest].reference_id.as_str(),
            "scored record"
        );

        Ok(NeighborScore {
            record_id: record.id().to_string(),
            candidates,
            minimum,
            nearest,
        })
    }

    /// Score the record sitting at position `index` of its population
    ///
    /// The generator is derived from the run seed and `index`, so the same
    /// seed always gives the same subsets.
    pub fn score_at(&self, index: usize, record: &MultivariateRecord) -> Result<NeighborScore> {
        let mut rng = StdRng::seed_from_u64(record_seed(self.seed, index as u64));
        self.score_record(record, &mut rng)
    }

    /// Score every anonymized record, one fresh reference subset each
    ///
    /// Returns once every record has a score, in population order. If any
    /// record fails, the error of the earliest failing record is returned
    /// and no scores are released.
    pub fn score_population(&self, anonymized: &[MultivariateRecord]) -> Result<Vec<NeighborScore>> {
        tracing::info!(
            records = anonymized.len(),
            pool = self.pool.len(),
            sample_size = self.sample_size,
            seed = self.seed,
            parallel = self.parallel,
            "scoring anonymized population"
        );

        let (tx, rx) = crossbeam::channel::unbounded();

        if self.parallel {
            anonymized
                .par_iter()
                .enumerate()
                .for_each_with(tx, |tx, (index, record)| {
                    // Receiver outlives every sender
                    let _ = tx.send((index, self.score_at(index, record)));
                });
        } else {
            for (index, record) in anonymized.iter().enumerate() {
                let _ = tx.send((index, self.score_at(index, record)));
            }
            drop(tx);
        }

        let mut accumulator = ScoreAccumulator::new(anonymized.len());
        let mut first_error: Option<(usize, EvalError)> = None;

        for (index, result) in rx.iter() {
            match result {
                Ok(score) => accumulator.insert(index, score)?,
                Err(e) => {
                    if first_error.as_ref().map_or(true, |(i, _)| index < *i) {
                        first_error = Some((index, e));
                    }
                }
            }
        }

        if let Some((_, e)) = first_error {
            return Err(e);
        }

        let scores = accumulator.into_scores()?;
        tracing::info!(scored = scores.len(), "anonymized population scored");
        Ok(scores)
    }
}
