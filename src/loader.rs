//! Record directory loading
//!
//! A population lives in one directory, one file per patient named
//! `<id>_series.txt`. Each file is a headed CSV with a column per channel
//! (`FC`, `PAS`, `PAM`, `PAD`); other columns such as `Time` are ignored.
//! Empty cells are allowed at the tail of a column so channels of one
//! record may have different lengths.

use crate::channel::Channel;
use crate::error::{EvalError, Result};
use crate::record::{MultivariateRecord, Origin, TimeSeries};
use regex::Regex;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// File name suffix of a series file
pub const SERIES_SUFFIX: &str = "_series.txt";

/// List the series files of a directory in patient order
///
/// Files are ordered by the integer formed by all digits of the file name,
/// then by name. Files without digits sort first.
pub fn discover_series(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| EvalError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let non_digit = Regex::new(r"\D")?;

    let mut keyed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| EvalError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(SERIES_SUFFIX) || !path.is_file() {
            continue;
        }

        let digits = non_digit.replace_all(name, "");
        // u128 holds 38 digits; longer runs fall back to name order
        let number = digits.parse::<u128>().unwrap_or(0);
        keyed.push((number, name.to_string(), path));
    }

    keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    tracing::debug!(dir = %dir.display(), files = keyed.len(), "series files discovered");
    Ok(keyed.into_iter().map(|(_, _, path)| path).collect())
}

/// Record id of a series file: the file name without `_series.txt`
pub fn record_id(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    Some(name.strip_suffix(SERIES_SUFFIX).unwrap_or(name).to_string())
}

/// Parse one series file into a record
pub fn load_record(path: &Path, origin: Origin) -> Result<MultivariateRecord> {
    let malformed = |reason: String| EvalError::MalformedRecord {
        path: path.to_path_buf(),
        reason,
    };
    let csv_error = |source: csv::Error| EvalError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = reader.headers().map_err(csv_error)?.clone();
    let mut columns = [0usize; Channel::COUNT];
    for channel in Channel::ALL {
        columns[channel.index()] = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(channel.column()))
            .ok_or_else(|| malformed(format!("missing {} column", channel.column())))?;
    }

    let mut series: [Vec<f64>; Channel::COUNT] = Default::default();
    let mut ended = [false; Channel::COUNT];

    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(csv_error)?;
        for channel in Channel::ALL {
            let i = channel.index();
            let cell = record.get(columns[i]).unwrap_or("");
            if cell.is_empty() {
                ended[i] = true;
                continue;
            }
            if ended[i] {
                return Err(malformed(format!(
                    "{} column has a gap before row {}",
                    channel.column(),
                    row + 2
                )));
            }
            let value = cell.parse::<f64>().map_err(|_| {
                malformed(format!(
                    "row {}: {} value '{}' is not a number",
                    row + 2,
                    channel.column(),
                    cell
                ))
            })?;
            series[i].push(value);
        }
    }

    let id = record_id(path).ok_or_else(|| malformed("file name is not valid UTF-8".into()))?;
    Ok(MultivariateRecord::new(id, origin, series.map(TimeSeries::new)))
}

/// Load every series file of a directory, in patient order
pub fn load_population(dir: &Path, origin: Origin) -> Result<Vec<MultivariateRecord>> {
    let records = discover_series(dir)?
        .iter()
        .map(|path| load_record(path, origin))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        dir = %dir.display(),
        origin = ?origin,
        records = records.len(),
        "population loaded"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "Time,FC,PAS,PAM,PAD\n";

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_discover_orders_by_embedded_number() {
        let dir = TempDir::new().unwrap();
        for name in [
            "patient_10_series.txt",
            "patient_2_series.txt",
            "patient_1_series.txt",
            "patient_2_summary.txt",
            "notes.txt",
        ] {
            write(dir.path(), name, HEADER);
        }

        let names: Vec<String> = discover_series(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec![
                "patient_1_series.txt",
                "patient_2_series.txt",
                "patient_10_series.txt"
            ]
        );
    }

    #[test]
    fn test_discover_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = discover_series(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, EvalError::Io { .. }));
    }

    #[test]
    fn test_load_record_by_header_name() {
        let dir = TempDir::new().unwrap();
        // Channel columns in a non-canonical order
        write(
            dir.path(),
            "p7_series.txt",
            "Time,PAD,FC,PAM,PAS\n0,80,72,93,120\n1,81,74,94,122\n2,79,73,92,118\n",
        );

        let record = load_record(&dir.path().join("p7_series.txt"), Origin::Real).unwrap();
        assert_eq!(record.id(), "p7");
        assert_eq!(record.origin(), Origin::Real);
        assert_eq!(record.channel(Channel::Fc).samples(), &[72.0, 74.0, 73.0]);
        assert_eq!(record.channel(Channel::Pas).samples(), &[120.0, 122.0, 118.0]);
        assert_eq!(record.channel(Channel::Pad).samples(), &[80.0, 81.0, 79.0]);
    }

    #[test]
    fn test_load_record_ragged_channels() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "p1_series.txt",
            "Time,FC,PAS,PAM,PAD\n0,72,120,93,80\n1,74,,94,81\n2,73,,,\n",
        );

        let record = load_record(&dir.path().join("p1_series.txt"), Origin::Anonymized).unwrap();
        assert_eq!(record.channel(Channel::Fc).len(), 3);
        assert_eq!(record.channel(Channel::Pas).len(), 1);
        assert_eq!(record.channel(Channel::Pam).len(), 2);
        assert_eq!(record.channel(Channel::Pad).len(), 2);
    }

    #[test]
    fn test_load_record_missing_column() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "p1_series.txt", "Time,FC,PAS,PAM\n0,72,120,93\n");

        let err = load_record(&dir.path().join("p1_series.txt"), Origin::Real).unwrap_err();
        assert!(err.to_string().contains("missing PAD column"));
    }

    #[test]
    fn test_load_record_non_numeric_cell() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "p1_series.txt", "Time,FC,PAS,PAM,PAD\n0,72,high,93,80\n");

        let err = load_record(&dir.path().join("p1_series.txt"), Origin::Real).unwrap_err();
        assert!(matches!(err, EvalError::MalformedRecord { .. }));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_load_record_gap_in_column() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "p1_series.txt",
            "Time,FC,PAS,PAM,PAD\n0,72,120,93,80\n1,,121,94,81\n2,73,122,95,82\n",
        );

        let err = load_record(&dir.path().join("p1_series.txt"), Origin::Real).unwrap_err();
        assert!(err.to_string().contains("gap"));
    }

    #[test]
    fn test_load_population_keeps_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "p3_series.txt", "FC,PAS,PAM,PAD\n3,3,3,3\n");
        write(dir.path(), "p1_series.txt", "FC,PAS,PAM,PAD\n1,1,1,1\n");

        let records = load_population(dir.path(), Origin::Anonymized).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }
}
