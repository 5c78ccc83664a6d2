// Reference sampling without replacement

use crate::error::{EvalError, Result};
use rand::Rng;

/// Derive the seed of one record's generator from the run seed
///
/// SplitMix64 over `base_seed + index * golden_ratio`: neighbouring indices
/// give unrelated streams.
pub fn record_seed(base_seed: u64, index: u64) -> u64 {
    let mut z = base_seed.wrapping_add(index.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Draw `k` distinct positions uniformly from `0..pool_len`
///
/// The returned order is the sampling order, which decides tie-breaking
/// between equal candidates.
///
/// # Errors
/// `InsufficientPool` if `pool_len < k`.
pub fn sample_references<R: Rng + ?Sized>(
    rng: &mut R,
    pool_len: usize,
    k: usize,
) -> Result<Vec<usize>> {
    if pool_len < k {
        return Err(EvalError::InsufficientPool {
            required: k,
            actual: pool_len,
        });
    }

    Ok(rand::seq::index::sample(rng, pool_len, k).into_vec())
}
