//! CSV artifacts of an evaluation run
//!
//! One file per artifact, named after the parameter setting so runs over a
//! grid of settings can share an output directory.

use crate::channel::{Channel, Metric};
use crate::compare::{ComparisonBattery, ComparisonResult, SummaryMetricSample};
use crate::error::{EvalError, Result};
use crate::setting::ParameterSetting;
use std::fs;
use std::path::{Path, PathBuf};

/// `distri_dissim_norm_meth1_<setting>.csv`
pub fn dissimilarity_file_name(setting: &ParameterSetting) -> String {
    format!("distri_dissim_norm_meth1_{}.csv", setting)
}

/// `<label>_values_meth1_<CHANNEL>_<setting>.csv`
pub fn metric_sample_file_name(
    channel: Channel,
    metric: Metric,
    setting: &ParameterSetting,
) -> String {
    format!(
        "{}_values_meth1_{}_{}.csv",
        metric.label(),
        channel.column(),
        setting
    )
}

/// `test_meth1_<CHANNEL>_<label>_<setting>.csv`
pub fn comparison_file_name(channel: Channel, metric: Metric, setting: &ParameterSetting) -> String {
    format!(
        "test_meth1_{}_{}_{}.csv",
        channel.column(),
        metric.label(),
        setting
    )
}

/// `test_meth1_<setting>.json`, the whole battery in one document
pub fn battery_json_file_name(setting: &ParameterSetting) -> String {
    format!("test_meth1_{}.json", setting)
}

fn open_writer(path: &Path) -> Result<csv::Writer<fs::File>> {
    csv::Writer::from_path(path).map_err(|source| EvalError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

fn finish(path: &Path, mut writer: csv::Writer<fs::File>) -> Result<()> {
    writer.flush().map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write normalized dissimilarities, one per line, 6 decimals
pub fn write_dissimilarities(path: &Path, values: &[f64]) -> Result<()> {
    let csv_err = |source| EvalError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = open_writer(path)?;
    writer.write_record(["dissim_norm"]).map_err(csv_err)?;
    for value in values {
        writer
            .write_record([format!("{:.6}", value)])
            .map_err(csv_err)?;
    }
    finish(path, writer)
}

fn cell(column: &[f64], row: usize) -> String {
    column.get(row).map(|v| v.to_string()).unwrap_or_default()
}

/// Write the anonymized and real columns of one summary metric
///
/// Rows are aligned by index; the shorter column is padded with empty cells.
pub fn write_metric_sample(path: &Path, metric: Metric, sample: &SummaryMetricSample) -> Result<()> {
    let csv_err = |source| EvalError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = open_writer(path)?;
    writer
        .write_record([
            format!("{}_anonym", metric.label()),
            format!("{}_real", metric.label()),
        ])
        .map_err(csv_err)?;

    let rows = sample.anonymized.len().max(sample.real.len());
    for row in 0..rows {
        writer
            .write_record([cell(&sample.anonymized, row), cell(&sample.real, row)])
            .map_err(csv_err)?;
    }
    finish(path, writer)
}

/// Write one comparison result as a single row
pub fn write_comparison(path: &Path, result: &ComparisonResult) -> Result<()> {
    let csv_err = |source| EvalError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = open_writer(path)?;
    writer
        .write_record(["statKS", "pvalKS", "statWMW_up", "pvalWMW_up"])
        .map_err(csv_err)?;
    writer
        .write_record([
            result.ks.statistic.to_string(),
            result.ks.p_value.to_string(),
            result.mann_whitney.statistic.to_string(),
            result.mann_whitney.p_value.to_string(),
        ])
        .map_err(csv_err)?;
    finish(path, writer)
}

/// Write every successful comparison of a battery into `dir`
///
/// Failed tuples produce no file. Returns the paths written.
pub fn write_battery(dir: &Path, battery: &ComparisonBattery) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (key, result) in battery.successes() {
        let path = dir.join(comparison_file_name(key.channel, key.metric, &key.setting));
        write_comparison(&path, result)?;
        written.push(path);
    }
    Ok(written)
}

/// Write the battery, failures included, as pretty JSON
pub fn write_battery_json(path: &Path, battery: &ComparisonBattery) -> Result<()> {
    let json = battery.to_json()?;
    fs::write(path, json).map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })
}
