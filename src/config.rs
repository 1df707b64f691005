use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::models::ParamOverrides;
use crate::waveform;

/// Everything needed for one run. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Model kind name, resolved when the run starts.
    pub model: String,
    /// Overrides applied on top of the model's default parameters.
    pub params: ParamOverrides,
    pub waveform: String,
    /// Drive frequency (Hz).
    pub frequency: f64,
    /// Drive amplitude (V).
    pub amplitude: f64,
    pub duration: f64,
    pub dt: f64,
    /// Reject unknown waveforms and non-finite currents instead of carrying on.
    pub strict: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            model: "linear".into(),
            params: ParamOverrides::new(),
            waveform: "sine".into(),
            frequency: 1e4,
            amplitude: 1.0,
            duration: 2e-4,
            dt: 1e-7,
            strict: false,
        }
    }
}

impl SimulationConfig {
    /// Loads a config from YAML, or JSON when the file ends in `.json`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn from_yaml(content: &str) -> SimResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Number of samples a run of this config produces, without building them.
    pub fn step_count(&self) -> usize {
        waveform::step_count(self.duration, self.dt)
    }
}
