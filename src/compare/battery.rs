// Comparison battery over (channel, metric) tuples for one setting
//
// Every tuple is run and recorded independently; a failure is kept next to
// the successes instead of aborting the battery.

use crate::channel::{Channel, Metric};
use crate::compare::{compare_samples, ComparisonResult, SummaryMetricSample};
use crate::error::{ErrorContext, EvalError, Result};
use crate::setting::ParameterSetting;
use serde::Serialize;

/// Identity of one comparison unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparisonKey {
    pub channel: Channel,
    pub metric: Metric,
    pub setting: ParameterSetting,
}

impl ComparisonKey {
    pub fn error_context(&self) -> ErrorContext {
        ErrorContext::default()
            .with_channel(self.channel)
            .with_metric(self.metric)
            .with_setting(self.setting.to_string())
    }
}

/// Result of one comparison unit
#[derive(Debug)]
pub struct ComparisonOutcome {
    pub key: ComparisonKey,
    pub result: Result<ComparisonResult>,
}

/// All comparison outcomes for one parameter setting
#[derive(Debug)]
pub struct ComparisonBattery {
    pub setting: ParameterSetting,
    pub outcomes: Vec<ComparisonOutcome>,
}

#[derive(Serialize)]
struct OutcomeView<'a> {
    channel: Channel,
    metric: Metric,
    setting: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a ComparisonResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ComparisonBattery {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, channel: Channel, metric: Metric) -> Option<&ComparisonOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.key.channel == channel && o.key.metric == metric)
    }

    pub fn successes(&self) -> impl Iterator<Item = (&ComparisonKey, &ComparisonResult)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|r| (&o.key, r)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ComparisonKey, &EvalError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.key, e)))
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();
        let failed = self.failures().count();

        report.push_str(&format!("Distribution tests for {}\n", self.setting));
        report.push_str(&format!(
            "Comparisons: {} ({} failed)\n\n",
            self.outcomes.len(),
            failed
        ));
        report.push_str(&format!(
            "  {:<4} {:<4} {:>10} {:>12} {:>12} {:>12}\n",
            "chan", "stat", "statKS", "pvalKS", "statWMW_up", "pvalWMW_up"
        ));

        for outcome in &self.outcomes {
            let key = &outcome.key;
            match &outcome.result {
                Ok(r) => report.push_str(&format!(
                    "  {:<4} {:<4} {:>10.6} {:>12.6} {:>12.1} {:>12.6}\n",
                    key.channel.column(),
                    key.metric.label(),
                    r.ks.statistic,
                    r.ks.p_value,
                    r.mann_whitney.statistic,
                    r.mann_whitney.p_value
                )),
                Err(e) => report.push_str(&format!(
                    "  {:<4} {:<4} FAILED: {}\n",
                    key.channel.column(),
                    key.metric.label(),
                    e
                )),
            }
        }

        report
    }

    /// Render every outcome, successes and failures, as a JSON array
    pub fn to_json(&self) -> Result<String> {
        let views: Vec<OutcomeView<'_>> = self
            .outcomes
            .iter()
            .map(|o| OutcomeView {
                channel: o.key.channel,
                metric: o.key.metric,
                setting: o.key.setting.to_string(),
                result: o.result.as_ref().ok(),
                error: o.result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();

        Ok(serde_json::to_string_pretty(&views)?)
    }
}

/// Run the test pair on every sample, isolating failures per tuple
pub fn run_battery<I>(samples: I, setting: &ParameterSetting) -> ComparisonBattery
where
    I: IntoIterator<Item = (Channel, Metric, SummaryMetricSample)>,
{
    let outcomes = samples
        .into_iter()
        .map(|(channel, metric, sample)| {
            let key = ComparisonKey {
                channel,
                metric,
                setting: setting.clone(),
            };

            let result = compare_samples(&sample).map_err(|e| e.with_context(key.error_context()));
            if let Err(e) = &result {
                tracing::warn!("Comparison failed for {} {}: {}", channel, metric, e);
            }

            ComparisonOutcome { key, result }
        })
        .collect();

    ComparisonBattery {
        setting: setting.clone(),
        outcomes,
    }
}
