//! Patient records: one time series per physiological channel

use crate::channel::Channel;
use serde::{Deserialize, Serialize};

/// Ordered samples of one channel of one record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    samples: Vec<f64>,
}

impl TimeSeries {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<f64>> for TimeSeries {
    fn from(samples: Vec<f64>) -> Self {
        Self::new(samples)
    }
}

impl From<&[f64]> for TimeSeries {
    fn from(samples: &[f64]) -> Self {
        Self::new(samples.to_vec())
    }
}

/// Which population a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Real,
    Anonymized,
}

/// A patient record with one series per channel
///
/// Channels may have different lengths, both within a record and across
/// records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultivariateRecord {
    id: String,
    origin: Origin,
    channels: [TimeSeries; Channel::COUNT],
}

impl MultivariateRecord {
    /// Build a record from series given in [`Channel::ALL`] order
    pub fn new(
        id: impl Into<String>,
        origin: Origin,
        channels: [TimeSeries; Channel::COUNT],
    ) -> Self {
        Self {
            id: id.into(),
            origin,
            channels,
        }
    }

    /// Convenience constructor from raw sample vectors (FC, PAS, PAM, PAD)
    pub fn from_samples(
        id: impl Into<String>,
        origin: Origin,
        fc: Vec<f64>,
        pas: Vec<f64>,
        pam: Vec<f64>,
        pad: Vec<f64>,
    ) -> Self {
        Self::new(
            id,
            origin,
            [fc.into(), pas.into(), pam.into(), pad.into()],
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn channel(&self, channel: Channel) -> &TimeSeries {
        &self.channels[channel.index()]
    }

    /// Iterate `(channel, series)` pairs in channel order
    pub fn channels(&self) -> impl Iterator<Item = (Channel, &TimeSeries)> {
        Channel::ALL.iter().map(move |&c| (c, self.channel(c)))
    }
}
