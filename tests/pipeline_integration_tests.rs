// Library-level integration tests: directories in, reports out

mod utils;

use anonym_eval::channel::{Channel, Metric};
use anonym_eval::config::EvalConfig;
use anonym_eval::loader::load_population;
use anonym_eval::pipeline::{compare_populations, describe_populations, score_population};
use anonym_eval::record::Origin;
use anonym_eval::setting::ParameterSetting;
use anonym_eval::EvalError;
use tempfile::TempDir;

fn config(k: usize, seed: u64) -> EvalConfig {
    let mut config = EvalConfig::seeded(seed);
    config.sample_size = k;
    config
}

#[test]
fn test_loaded_population_matches_in_memory_one() {
    let dir = TempDir::new().unwrap();
    utils::write_population(dir.path(), Origin::Real, 12);

    let loaded = load_population(dir.path(), Origin::Real).unwrap();
    let expected = utils::population(Origin::Real, 12);

    // real_10 and real_11 sort after real_9
    let ids: Vec<&str> = loaded.iter().map(|r| r.id()).collect();
    assert_eq!(ids[9], "real_9");
    assert_eq!(ids[11], "real_11");
    assert_eq!(loaded, expected);
}

#[test]
fn test_three_real_two_anonymized() {
    let real = utils::population(Origin::Real, 3);
    let anonymized = utils::population(Origin::Anonymized, 2);

    let report = score_population(&real, &anonymized, &config(2, 5)).unwrap();
    assert_eq!(report.minimum_distances().len(), 2);
    assert_eq!(report.dissimilarities.len(), 2);
    let mean: f64 = report.dissimilarities.iter().sum::<f64>() / 2.0;
    assert!(mean.abs() < 1e-12);
}

#[test]
fn test_three_real_one_anonymized() {
    let real = utils::population(Origin::Real, 3);
    let anonymized = utils::population(Origin::Anonymized, 1);

    let err = score_population(&real, &anonymized, &config(2, 5)).unwrap_err();
    assert!(matches!(err, EvalError::InsufficientSample { .. }));
}

#[test]
fn test_normalized_scores_are_standardized() {
    let real = utils::population(Origin::Real, 8);
    let anonymized = utils::population(Origin::Anonymized, 6);

    let report = score_population(&real, &anonymized, &config(4, 9)).unwrap();
    let z = &report.dissimilarities;
    let n = z.len() as f64;
    let mean = z.iter().sum::<f64>() / n;
    let var = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    assert!(mean.abs() < 1e-9);
    assert!((var.sqrt() - 1.0).abs() < 1e-9);

    for score in &report.scores {
        assert_eq!(score.candidates.len(), 4);
        assert!(score.candidates.iter().all(|c| score.minimum <= c.distance));
    }
}

#[test]
fn test_parallel_and_sequential_runs_agree() {
    let real = utils::population(Origin::Real, 8);
    let anonymized = utils::population(Origin::Anonymized, 6);

    let parallel = score_population(&real, &anonymized, &config(3, 21)).unwrap();
    let mut sequential_config = config(3, 21);
    sequential_config.parallel = false;
    let sequential = score_population(&real, &anonymized, &sequential_config).unwrap();

    assert_eq!(parallel.dissimilarities, sequential.dissimilarities);
    assert_eq!(parallel.minimum_distances(), sequential.minimum_distances());
}

#[test]
fn test_describe_and_compare_share_columns() {
    let real = utils::population(Origin::Real, 5);
    let anonymized = utils::population(Origin::Anonymized, 4);
    let config = EvalConfig::seeded(1);
    let setting = ParameterSetting::new("0.25", "0.05");

    let table = describe_populations(&real, &anonymized, &config).unwrap();
    assert_eq!(table.len(), Channel::ALL.len() * Metric::ALL.len());
    let fc_min = table.get(Channel::Fc, Metric::Min).unwrap();
    assert_eq!(fc_min.real, vec![70.0, 71.0, 72.0, 73.0, 74.0]);
    assert_eq!(fc_min.anonymized.len(), 4);

    let battery = compare_populations(&real, &anonymized, &setting, &config).unwrap();
    assert_eq!(battery.len(), table.len());
    assert!(battery.all_succeeded());
    for (key, result) in battery.successes() {
        assert_eq!(key.setting, setting);
        assert!((0.0..=1.0).contains(&result.ks.p_value));
        assert!((0.0..=1.0).contains(&result.mann_whitney.p_value));
    }
}
