use thiserror::Error;

/// Errors surfaced by model construction, configuration and strict runs.
///
/// Domain violations never show up here: state is always clamped.
#[derive(Error, Debug)]
pub enum SimError {
    /// Model name outside the closed set of six variants.
    #[error("invalid model kind `{0}` (expected one of linear, biolek, joglekar, vteam, mms, yakopcic)")]
    InvalidModelKind(String),

    /// Waveform name rejected by strict parsing.
    #[error("unknown waveform family `{0}` (expected one of sine, square, triangle, sawtooth)")]
    UnknownWaveform(String),

    /// Parameter override that cannot be stored in the model's record.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Non-finite current observed in a strict run.
    #[error("numerical instability at step {step}: current = {value}")]
    NumericInstability { step: usize, value: f64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
