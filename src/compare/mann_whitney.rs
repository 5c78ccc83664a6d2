// Mann-Whitney U test for two independent samples
//
// The reported statistic is U for the first (anonymized) sample:
// U1 = R1 - n1(n1+1)/2 with mid-ranks for ties. The two-sided p-value uses
// U = max(U1, U2):
//
// - exact null distribution when either sample has at most 8 values and
//   there are no ties
// - otherwise the normal approximation with tie-corrected variance and a
//   0.5 continuity correction

use crate::compare::TestResult;
use crate::error::{EvalError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// The exact distribution is used when the smaller sample has at most this many values
const EXACT_MAX_SIZE: usize = 8;

const TEST_NAME: &str = "Mann-Whitney U";

/// Two-sided Mann-Whitney U test, unpaired
///
/// # Example
/// ```
/// use anonym_eval::compare::mann_whitney_u;
///
/// let r = mann_whitney_u(&[1.0, 2.0, 3.0, 4.0, 5.0], &[6.0, 7.0, 8.0, 9.0, 10.0]).unwrap();
/// assert_eq!(r.statistic, 0.0);
/// assert!((r.p_value - 2.0 / 252.0).abs() < 1e-12);
/// ```
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<TestResult> {
    if x.is_empty() || y.is_empty() {
        return Err(EvalError::statistical_test(TEST_NAME, "empty sample"));
    }

    let (n1, n2) = (x.len(), y.len());
    let ranking = rank_pooled(x, y);

    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let u1 = ranking.first_rank_sum - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;
    let u = u1.max(u2);

    let exact = if n1.min(n2) <= EXACT_MAX_SIZE && ranking.tie_term == 0.0 {
        exact_upper_tail(u.round() as usize, n1, n2)
    } else {
        None
    };

    let p_value = match exact {
        Some(tail) => 2.0 * tail,
        None => asymptotic_p_value(u, n1, n2, ranking.tie_term)?,
    };

    Ok(TestResult {
        statistic: u1,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

struct PooledRanking {
    /// Sum of mid-ranks of the first sample
    first_rank_sum: f64,
    /// Sum of t^3 - t over tie groups
    tie_term: f64,
}

/// Rank the pooled samples, averaging ranks inside tie groups
fn rank_pooled(x: &[f64], y: &[f64]) -> PooledRanking {
    let mut pooled: Vec<(f64, bool)> = x
        .iter()
        .map(|&v| (v, true))
        .chain(y.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut first_rank_sum = 0.0;
    let mut tie_term = 0.0;
    let mut start = 0;

    while start < pooled.len() {
        let mut end = start + 1;
        while end < pooled.len() && pooled[end].0 == pooled[start].0 {
            end += 1;
        }

        // Ranks are 1-based: the group covers ranks start+1 ..= end
        let mid_rank = (start + 1 + end) as f64 / 2.0;
        let from_first = pooled[start..end].iter().filter(|(_, first)| *first).count();
        first_rank_sum += mid_rank * from_first as f64;

        let t = (end - start) as f64;
        tie_term += t * t * t - t;

        start = end;
    }

    PooledRanking {
        first_rank_sum,
        tie_term,
    }
}

/// P(U >= u) under the null for sample sizes `m` and `n`, no ties
///
/// `None` when the counts do not fit in 128 bits.
fn exact_upper_tail(u: usize, m: usize, n: usize) -> Option<f64> {
    let counts = u_frequencies(m, n)?;
    let total: f64 = counts.iter().map(|&c| c as f64).sum();
    let upper: f64 = counts.iter().skip(u).map(|&c| c as f64).sum();
    Some(upper / total)
}

/// Number of orderings giving each value of U, for U in 0..=m*n
///
/// These are the coefficients of the Gaussian binomial [m+n, m]_q, built
/// as the product over k = 1..=min(m,n) of (1 - q^(max+k)) / (1 - q^k).
/// Each partial product is itself a Gaussian binomial, so every division
/// is exact and a single polynomial of degree m*n is all the memory used.
fn u_frequencies(m: usize, n: usize) -> Option<Vec<i128>> {
    let (small, large) = if m <= n { (m, n) } else { (n, m) };

    // Multiplying by 1 - q^(large+k) briefly overshoots the final degree by k
    let mut coeffs = vec![0_i128; small * large + small + 1];
    coeffs[0] = 1;
    let mut degree = 0;

    for k in 1..=small {
        let shift = large + k;
        for t in (shift..=degree + shift).rev() {
            coeffs[t] = coeffs[t].checked_sub(coeffs[t - shift])?;
        }
        for t in k..=degree + shift {
            coeffs[t] = coeffs[t].checked_add(coeffs[t - k])?;
        }
        degree = k * large;
    }

    coeffs.truncate(small * large + 1);
    Some(coeffs)
}

fn asymptotic_p_value(u: f64, n1: usize, n2: usize, tie_term: f64) -> Result<f64> {
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let n = n1f + n2f;

    let mean = n1f * n2f / 2.0;
    let variance = n1f * n2f / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));

    if variance.is_nan() || variance <= 0.0 {
        return Err(EvalError::statistical_test(
            TEST_NAME,
            "all values are identical, U has zero variance",
        ));
    }

    let z = (u - mean - 0.5) / variance.sqrt();
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| EvalError::statistical_test(TEST_NAME, e.to_string()))?;

    Ok(2.0 * normal.sf(z))
}
