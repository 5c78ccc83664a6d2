//! Physiological channels and derived summary metrics
//!
//! Every per-channel computation in the crate iterates over [`Channel::ALL`]
//! (or a configured subset of it) instead of carrying one code path per
//! channel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One physiological measurement stream of a patient record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    /// Heart rate (FC)
    Fc,
    /// Systolic arterial pressure (PAS)
    Pas,
    /// Mean arterial pressure (PAM)
    Pam,
    /// Diastolic arterial pressure (PAD)
    Pad,
}

impl Channel {
    /// All channels, in record column order
    pub const ALL: [Channel; 4] = [Channel::Fc, Channel::Pas, Channel::Pam, Channel::Pad];

    /// Number of channels in a multivariate record
    pub const COUNT: usize = 4;

    /// Column header used in record files
    pub fn column(self) -> &'static str {
        match self {
            Channel::Fc => "FC",
            Channel::Pas => "PAS",
            Channel::Pam => "PAM",
            Channel::Pad => "PAD",
        }
    }

    /// Position of this channel inside a record
    pub fn index(self) -> usize {
        match self {
            Channel::Fc => 0,
            Channel::Pas => 1,
            Channel::Pam => 2,
            Channel::Pad => 3,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FC" => Ok(Channel::Fc),
            "PAS" => Ok(Channel::Pas),
            "PAM" => Ok(Channel::Pam),
            "PAD" => Ok(Channel::Pad),
            other => Err(format!(
                "unknown channel '{}' (expected FC, PAS, PAM or PAD)",
                other
            )),
        }
    }
}

/// Descriptive statistic derived from one channel of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Mean,
    Std,
    Median,
    Min,
    Max,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Mean,
        Metric::Std,
        Metric::Median,
        Metric::Min,
        Metric::Max,
    ];

    /// Short label used in column headers and file names (`avg`, `std`, ...)
    pub fn label(self) -> &'static str {
        match self {
            Metric::Mean => "avg",
            Metric::Std => "std",
            Metric::Median => "med",
            Metric::Min => "min",
            Metric::Max => "max",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_index_matches_order() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
        assert_eq!(Channel::ALL.len(), Channel::COUNT);
    }

    #[test]
    fn test_channel_parse_case_insensitive() {
        assert_eq!("fc".parse::<Channel>().unwrap(), Channel::Fc);
        assert_eq!("PAD".parse::<Channel>().unwrap(), Channel::Pad);
        assert!("SpO2".parse::<Channel>().is_err());
    }

    #[test]
    fn test_metric_labels() {
        let labels: Vec<_> = Metric::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["avg", "std", "med", "min", "max"]);
    }
}
