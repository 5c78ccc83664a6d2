//! Error taxonomy for scoring and comparison
//!
//! Every failure is terminal for the operation that raised it. Errors carry
//! the offending record, channel, metric and parameter setting whenever the
//! raising site knows them, so a caller can report exactly which unit failed.

use crate::channel::{Channel, Metric};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Where an error happened: record, channel, metric, parameter setting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub record: Option<String>,
    pub channel: Option<Channel>,
    pub metric: Option<Metric>,
    pub setting: Option<String>,
}

impl ErrorContext {
    pub fn record(id: impl Into<String>) -> Self {
        Self {
            record: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }

    pub fn with_setting(mut self, setting: impl Into<String>) -> Self {
        self.setting = Some(setting.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_none()
            && self.channel.is_none()
            && self.metric.is_none()
            && self.setting.is_none()
    }

    /// Fill the fields that are still unset from `other`
    fn merge(&mut self, other: ErrorContext) {
        if self.record.is_none() {
            self.record = other.record;
        }
        if self.channel.is_none() {
            self.channel = other.channel;
        }
        if self.metric.is_none() {
            self.metric = other.metric;
        }
        if self.setting.is_none() {
            self.setting = other.setting;
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }

        let mut parts = Vec::new();
        if let Some(record) = &self.record {
            parts.push(format!("record={}", record));
        }
        if let Some(channel) = self.channel {
            parts.push(format!("channel={}", channel));
        }
        if let Some(metric) = self.metric {
            parts.push(format!("metric={}", metric));
        }
        if let Some(setting) = &self.setting {
            parts.push(format!("setting={}", setting));
        }
        write!(f, " ({})", parts.join(", "))
    }
}

/// Errors raised by the evaluation engine
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Invalid input sequence: {reason}{context}")]
    InvalidInput {
        reason: String,
        context: ErrorContext,
    },

    #[error("Insufficient reference pool: need at least {required} real records, got {actual}")]
    InsufficientPool { required: usize, actual: usize },

    #[error("Insufficient sample: need at least {required} values, got {actual}")]
    InsufficientSample { required: usize, actual: usize },

    #[error("Degenerate distribution: all {count} distances are equal to {value}")]
    DegenerateDistribution { count: usize, value: f64 },

    #[error("Incomplete population: expected {expected} minimum distances, received {received}")]
    IncompletePopulation { expected: usize, received: usize },

    #[error("Invalid sample: {reason}{context}")]
    InvalidSample {
        reason: String,
        context: ErrorContext,
    },

    #[error("{test} test failed: {reason}{context}")]
    StatisticalTest {
        test: &'static str,
        reason: String,
        context: ErrorContext,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed record file {}: {reason}", .path.display())]
    MalformedRecord { path: PathBuf, reason: String },

    #[error("Config parse error in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        EvalError::InvalidInput {
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn invalid_sample(reason: impl Into<String>) -> Self {
        EvalError::InvalidSample {
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn statistical_test(test: &'static str, reason: impl Into<String>) -> Self {
        EvalError::StatisticalTest {
            test,
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    /// Attach record/channel/metric/setting details to a contextual error
    ///
    /// Fields already set by an inner call site win. Variants that carry no
    /// context are returned unchanged.
    pub fn with_context(mut self, ctx: ErrorContext) -> Self {
        match &mut self {
            EvalError::InvalidInput { context, .. }
            | EvalError::InvalidSample { context, .. }
            | EvalError::StatisticalTest { context, .. } => context.merge(ctx),
            _ => {}
        }
        self
    }

    /// Context attached to this error, if the variant carries one
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            EvalError::InvalidInput { context, .. }
            | EvalError::InvalidSample { context, .. }
            | EvalError::StatisticalTest { context, .. } => Some(context),
            _ => None,
        }
    }
}
