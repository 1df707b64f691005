use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::warn;

use crate::error::{SimError, SimResult};

pub mod drift;
pub mod mms;
pub mod vteam;
pub mod yakopcic;

pub use drift::{Biolek, DriftParams, Joglekar, LinearIonDrift, WindowedDriftParams};
pub use mms::{Mms, MmsParams};
pub use vteam::{Vteam, VteamParams};
pub use yakopcic::{Yakopcic, YakopcicParams};

/// Named parameter overrides, as typed into a form or a config file.
pub type ParamOverrides = BTreeMap<String, f64>;

// Defines the state-update / current-readout contract shared by every device model.
pub trait MemristorModel: Send + Sync {
    /// Current (A) drawn at voltage `v` for the present state. Never mutates.
    fn current(&self, v: f64) -> f64;

    /// One forward Euler step of size `dt` with the derivative taken at the
    /// present state, followed by a clamp into the domain.
    fn advance(&mut self, v: f64, dt: f64);

    /// Internal state variable (w or x).
    fn state(&self) -> f64;

    /// Closed interval the state is kept in.
    fn domain(&self) -> (f64, f64);

    /// Memristance (Ohms) for the present state.
    fn memristance(&self) -> f64;

    fn conductance(&self) -> f64 {
        1.0 / self.memristance()
    }
}

// Saturating clamp. Unlike f64::clamp this never panics on an inverted range.
pub(crate) fn saturate(s: f64, lo: f64, hi: f64) -> f64 {
    s.max(lo).min(hi)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ModelKind {
    Linear,
    Biolek,
    Joglekar,
    Vteam,
    Mms,
    Yakopcic,
}

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        ModelKind::Linear,
        ModelKind::Biolek,
        ModelKind::Joglekar,
        ModelKind::Vteam,
        ModelKind::Mms,
        ModelKind::Yakopcic,
    ];

    /// Every accepted spelling, canonical names first. Config files and
    /// command-line parsing both resolve through this table.
    pub const NAMES: [(&'static str, ModelKind); 9] = [
        ("linear", ModelKind::Linear),
        ("biolek", ModelKind::Biolek),
        ("joglekar", ModelKind::Joglekar),
        ("vteam", ModelKind::Vteam),
        ("mms", ModelKind::Mms),
        ("yakopcic", ModelKind::Yakopcic),
        ("linear_ion_drift", ModelKind::Linear),
        ("lineariondrift", ModelKind::Linear),
        ("hp", ModelKind::Linear),
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Biolek => "biolek",
            ModelKind::Joglekar => "joglekar",
            ModelKind::Vteam => "vteam",
            ModelKind::Mms => "mms",
            ModelKind::Yakopcic => "yakopcic",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ModelKind::NAMES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|&(_, kind)| kind)
            .ok_or_else(|| SimError::InvalidModelKind(s.to_string()))
    }
}

impl TryFrom<String> for ModelKind {
    type Error = SimError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Parameter record of one model, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelParams {
    Linear(DriftParams),
    Biolek(WindowedDriftParams),
    Joglekar(WindowedDriftParams),
    Vteam(VteamParams),
    Mms(MmsParams),
    Yakopcic(YakopcicParams),
}

impl ModelParams {
    pub fn defaults(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Linear => ModelParams::Linear(DriftParams::default()),
            ModelKind::Biolek => ModelParams::Biolek(WindowedDriftParams::default()),
            ModelKind::Joglekar => ModelParams::Joglekar(WindowedDriftParams::default()),
            ModelKind::Vteam => ModelParams::Vteam(VteamParams::default()),
            ModelKind::Mms => ModelParams::Mms(MmsParams::default()),
            ModelKind::Yakopcic => ModelParams::Yakopcic(YakopcicParams::default()),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            ModelParams::Linear(_) => ModelKind::Linear,
            ModelParams::Biolek(_) => ModelKind::Biolek,
            ModelParams::Joglekar(_) => ModelKind::Joglekar,
            ModelParams::Vteam(_) => ModelKind::Vteam,
            ModelParams::Mms(_) => ModelKind::Mms,
            ModelParams::Yakopcic(_) => ModelKind::Yakopcic,
        }
    }

    /// Applies named overrides on top of this record.
    ///
    /// Names the record does not carry are logged and skipped. Values go
    /// through the same serde path a config file does, so a fractional or
    /// negative window exponent is rejected rather than truncated. Each
    /// override is checked on its own so an error names the offending field.
    pub fn with_overrides(self, overrides: &ParamOverrides) -> SimResult<Self> {
        let kind = self.kind();
        let mut params = self;
        for (name, v) in overrides {
            let mut value = serde_json::to_value(&params)?;
            let Some(fields) = value.as_object_mut() else {
                break;
            };
            if name == "kind" || !fields.contains_key(name) {
                warn!(model = %kind, param = %name, "ignoring unknown model parameter");
                continue;
            }
            fields.insert(name.clone(), override_value(name, *v)?);
            params = serde_json::from_value(value).map_err(|e| SimError::InvalidParameter {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(params)
    }
}

fn override_value(name: &str, v: f64) -> SimResult<Value> {
    // integral values go in as integers so they also fit exponent fields
    if v.fract() == 0.0 && v.abs() < 9.0e15 {
        return Ok(Value::from(v as i64));
    }
    Number::from_f64(v)
        .map(Value::Number)
        .ok_or_else(|| SimError::InvalidParameter {
            name: name.to_string(),
            reason: format!("value {v} is not finite"),
        })
}

/// One live device: a closed choice over the six models.
#[derive(Debug, Clone)]
pub enum Memristor {
    Linear(LinearIonDrift),
    Biolek(Biolek),
    Joglekar(Joglekar),
    Vteam(Vteam),
    Mms(Mms),
    Yakopcic(Yakopcic),
}

macro_rules! each_model {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            Memristor::Linear($m) => $body,
            Memristor::Biolek($m) => $body,
            Memristor::Joglekar($m) => $body,
            Memristor::Vteam($m) => $body,
            Memristor::Mms($m) => $body,
            Memristor::Yakopcic($m) => $body,
        }
    };
}

impl Memristor {
    pub fn new(params: ModelParams) -> Self {
        match params {
            ModelParams::Linear(p) => Memristor::Linear(LinearIonDrift::new(p)),
            ModelParams::Biolek(p) => Memristor::Biolek(Biolek::new(p)),
            ModelParams::Joglekar(p) => Memristor::Joglekar(Joglekar::new(p)),
            ModelParams::Vteam(p) => Memristor::Vteam(Vteam::new(p)),
            ModelParams::Mms(p) => Memristor::Mms(Mms::new(p)),
            ModelParams::Yakopcic(p) => Memristor::Yakopcic(Yakopcic::new(p)),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Memristor::Linear(_) => ModelKind::Linear,
            Memristor::Biolek(_) => ModelKind::Biolek,
            Memristor::Joglekar(_) => ModelKind::Joglekar,
            Memristor::Vteam(_) => ModelKind::Vteam,
            Memristor::Mms(_) => ModelKind::Mms,
            Memristor::Yakopcic(_) => ModelKind::Yakopcic,
        }
    }
}

impl MemristorModel for Memristor {
    fn current(&self, v: f64) -> f64 {
        each_model!(self, m => m.current(v))
    }

    fn advance(&mut self, v: f64, dt: f64) {
        each_model!(self, m => m.advance(v, dt))
    }

    fn state(&self) -> f64 {
        each_model!(self, m => m.state())
    }

    fn domain(&self) -> (f64, f64) {
        each_model!(self, m => m.domain())
    }

    fn memristance(&self) -> f64 {
        each_model!(self, m => m.memristance())
    }

    fn conductance(&self) -> f64 {
        each_model!(self, m => m.conductance())
    }
}

impl fmt::Display for Memristor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(state={:.4e}, M={:.3}Ω)",
            self.kind(),
            self.state(),
            self.memristance()
        )
    }
}

/// Builds a fresh device of the named kind with `params` applied over its defaults.
pub fn create_model(kind: &str, params: &ParamOverrides) -> SimResult<Memristor> {
    let kind: ModelKind = kind.parse()?;
    let params = ModelParams::defaults(kind).with_overrides(params)?;
    Ok(Memristor::new(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
        }
        assert_eq!("VTEAM".parse::<ModelKind>().unwrap(), ModelKind::Vteam);
    }

    #[test]
    fn config_and_cli_accept_the_same_names() {
        for (name, kind) in ModelKind::NAMES {
            assert_eq!(name.parse::<ModelKind>().unwrap(), kind);
            let from_yaml: ModelKind = serde_yaml::from_str(name).unwrap();
            assert_eq!(from_yaml, kind, "{name}");
        }
        assert!(serde_yaml::from_str::<ModelKind>("memristor").is_err());
        assert_eq!(serde_yaml::to_string(&ModelKind::Linear).unwrap().trim(), "linear");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = create_model("spice", &ParamOverrides::new()).unwrap_err();
        assert!(matches!(err, SimError::InvalidModelKind(ref k) if k == "spice"));
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut params = ParamOverrides::new();
        params.insert("r_off".into(), 20e3);
        params.insert("p".into(), 2.0);
        match ModelParams::defaults(ModelKind::Joglekar).with_overrides(&params).unwrap() {
            ModelParams::Joglekar(p) => {
                assert_eq!(p.drift.r_off, 20e3);
                assert_eq!(p.p, 2);
                assert_eq!(p.drift.r_on, 100.0);
            }
            other => panic!("unexpected params {other:?}"),
        }
    }

    #[test]
    fn unknown_override_is_ignored() {
        let mut params = ParamOverrides::new();
        params.insert("flux".into(), 1.0);
        let m = create_model("mms", &params).unwrap();
        assert_eq!(m.kind(), ModelKind::Mms);
    }

    #[test]
    fn fractional_window_exponent_is_rejected() {
        let mut params = ParamOverrides::new();
        params.insert("r_off".into(), 2e4);
        params.insert("mu_v".into(), 2e-9);
        params.insert("p".into(), 1.5);
        let err = create_model("biolek", &params).unwrap_err();
        match err {
            SimError::InvalidParameter { name, .. } => assert_eq!(name, "p"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn initial_state_is_clamped_into_domain() {
        let mut params = ParamOverrides::new();
        params.insert("initial".into(), 5.0);
        let m = create_model("mms", &params).unwrap();
        assert_eq!(m.state(), 1.0);
    }

    #[test]
    fn saturate_tolerates_inverted_bounds() {
        assert_eq!(saturate(0.5, 1.0, 0.0), 0.0);
        assert_eq!(saturate(-1.0, 0.0, 1.0), 0.0);
        assert_eq!(saturate(2.0, 0.0, 1.0), 1.0);
    }
}
