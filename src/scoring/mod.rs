// Nearest-neighbor dissimilarity scoring
//
// For each anonymized record a fresh subset of K real records is drawn
// without replacement. The four channel DTW distances against every sampled
// reference are averaged into one multivariate distance, and the smallest
// of the K candidates is the record's minimum distance.
//
// Resampling is per record, never one subset shared across the run. Each
// record's generator is derived from (run seed, record position), so a run
// is reproducible from its seed regardless of how records are scheduled on
// worker threads.
//
// Results flow into a counted accumulator sized to the anonymized
// population; normalization only ever sees a complete population.

mod accumulator;
mod sampler;
mod scorer;

pub use accumulator::ScoreAccumulator;
pub use sampler::{record_seed, sample_references};
pub use scorer::{multivariate_distance, Candidate, NearestNeighborScorer, NeighborScore};
