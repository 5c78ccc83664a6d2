//! Anonymization parameter setting under evaluation
//!
//! The anonymization method is tuned by a proportion level and a
//! perturbation level; every output of a run is tagged with the pair.
//! Levels are kept as the strings the caller gave so file names round-trip
//! exactly (`0.50` stays `0.50`).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterSetting {
    pub prop_level: String,
    pub perturb_level: String,
}

impl ParameterSetting {
    pub fn new(prop_level: impl Into<String>, perturb_level: impl Into<String>) -> Self {
        Self {
            prop_level: prop_level.into(),
            perturb_level: perturb_level.into(),
        }
    }
}

impl fmt::Display for ParameterSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prop-level_{}_perturb-level_{}",
            self.prop_level, self.perturb_level
        )
    }
}
