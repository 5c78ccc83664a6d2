// Fixture populations for integration tests
//
// Records are small deterministic series with a per-record level so every
// summary metric varies across records.

#![allow(dead_code)]

use anonym_eval::record::{MultivariateRecord, Origin};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub const SERIES_LEN: usize = 8;

/// One channel value of record `i` at time `t`
fn value(origin: Origin, i: usize, t: usize, offset: f64) -> f64 {
    let wobble = ((i * 7 + t * 3) % 5) as f64;
    match origin {
        Origin::Real => 70.0 + offset + i as f64 + wobble,
        Origin::Anonymized => 71.5 + offset + i as f64 + wobble + 0.1 * (i + 1) as f64 * t as f64,
    }
}

const OFFSETS: [f64; 4] = [0.0, 50.0, 20.0, 10.0];

pub fn record(origin: Origin, i: usize) -> MultivariateRecord {
    let series = |offset: f64| -> Vec<f64> {
        (0..SERIES_LEN).map(|t| value(origin, i, t, offset)).collect()
    };
    let prefix = match origin {
        Origin::Real => "real",
        Origin::Anonymized => "anon",
    };
    MultivariateRecord::from_samples(
        format!("{}_{}", prefix, i),
        origin,
        series(OFFSETS[0]),
        series(OFFSETS[1]),
        series(OFFSETS[2]),
        series(OFFSETS[3]),
    )
}

pub fn population(origin: Origin, count: usize) -> Vec<MultivariateRecord> {
    (0..count).map(|i| record(origin, i)).collect()
}

/// Write `count` records as `<prefix>_<i>_series.txt` files into `dir`
pub fn write_population(dir: &Path, origin: Origin, count: usize) {
    fs::create_dir_all(dir).unwrap();
    let prefix = match origin {
        Origin::Real => "real",
        Origin::Anonymized => "anon",
    };

    for i in 0..count {
        let mut body = String::from("Time,FC,PAS,PAM,PAD\n");
        for t in 0..SERIES_LEN {
            write!(body, "{}", t).unwrap();
            for offset in OFFSETS {
                write!(body, ",{}", value(origin, i, t, offset)).unwrap();
            }
            body.push('\n');
        }
        fs::write(dir.join(format!("{}_{}_series.txt", prefix, i)), body).unwrap();
    }
}
