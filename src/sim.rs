use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::models::{create_model, MemristorModel};
use crate::waveform::{self, WaveformFamily};

/// Steps `model` through `voltages`, returning one current per sample.
///
/// Each current is read on the state *before* that sample's update, then the
/// model advances with the same voltage. Nothing is checked: a diverging
/// model shows up as NaN or infinities in the output.
pub fn simulate<M: MemristorModel + ?Sized>(model: &mut M, voltages: &[f64], dt: f64) -> Vec<f64> {
    let mut currents = Vec::with_capacity(voltages.len());
    for &v in voltages {
        currents.push(model.current(v));
        model.advance(v, dt);
    }
    currents
}

/// Same stepping as [`simulate`], stopping at the first non-finite current.
pub fn simulate_checked<M: MemristorModel + ?Sized>(
    model: &mut M,
    voltages: &[f64],
    dt: f64,
) -> SimResult<Vec<f64>> {
    let mut currents = Vec::with_capacity(voltages.len());
    for (step, &v) in voltages.iter().enumerate() {
        let i = model.current(v);
        if !i.is_finite() {
            return Err(SimError::NumericInstability { step, value: i });
        }
        currents.push(i);
        model.advance(v, dt);
    }
    Ok(currents)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub voltage: f64,
    pub current: f64,
    /// State and memristance before this sample's update.
    pub state: f64,
    pub memristance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    pub samples: Vec<Sample>,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn currents(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.current).collect()
    }

    pub fn voltages(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.voltage).collect()
    }

    pub fn states(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.state).collect()
    }

    /// Index of the first sample carrying a non-finite current.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.samples.iter().position(|s| !s.current.is_finite())
    }

    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "time,voltage,current,state,memristance")?;
        for s in &self.samples {
            writeln!(
                out,
                "{:.9e},{:.6e},{:.6e},{:.6e},{:.6e}",
                s.time, s.voltage, s.current, s.state, s.memristance
            )?;
        }
        Ok(())
    }
}

/// [`simulate`] with the time, state and memristance of every step recorded.
///
/// `times` and `voltages` are sample-aligned and must have the same length.
pub fn record<M: MemristorModel + ?Sized>(
    model: &mut M,
    times: &[f64],
    voltages: &[f64],
    dt: f64,
) -> Trace {
    debug_assert_eq!(times.len(), voltages.len(), "times and voltages are not sample-aligned");
    let mut samples = Vec::with_capacity(voltages.len());
    for (&time, &voltage) in times.iter().zip(voltages) {
        samples.push(Sample {
            time,
            voltage,
            current: model.current(voltage),
            state: model.state(),
            memristance: model.memristance(),
        });
        model.advance(voltage, dt);
    }
    Trace { samples }
}

/// Runs one simulation described by `config` on a freshly built model.
pub fn run(config: &SimulationConfig) -> SimResult<Trace> {
    let mut model = create_model(&config.model, &config.params)?;
    let family = if config.strict {
        config.waveform.parse::<WaveformFamily>()?
    } else {
        WaveformFamily::parse_lenient(&config.waveform)
    };
    let times = waveform::time_vector(config.duration, config.dt);
    debug!(
        model = %model,
        waveform = %family,
        frequency = config.frequency,
        amplitude = config.amplitude,
        steps = times.len(),
        "starting simulation"
    );

    let voltages = waveform::generate(family, &times, config.frequency, config.amplitude);
    let trace = record(&mut model, &times, &voltages, config.dt);

    if config.strict {
        if let Some(step) = trace.first_non_finite() {
            return Err(SimError::NumericInstability { step, value: trace.samples[step].current });
        }
    }
    info!(steps = trace.len(), final_state = %model, "simulation finished");
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DriftParams, LinearIonDrift, ParamOverrides};

    #[test]
    fn first_current_uses_initial_state() {
        let mut model = create_model("joglekar", &ParamOverrides::new()).unwrap();
        let expected = model.current(0.8);
        let currents = simulate(&mut model, &[0.8, 0.8, 0.8], 1e-6);
        assert_eq!(currents[0], expected);
        assert_ne!(currents[1], expected);
    }

    #[test]
    fn record_matches_simulate() {
        let times = waveform::time_vector(1e-4, 1e-7);
        let voltages = waveform::generate(WaveformFamily::Sine, &times, 1e4, 1.0);
        let mut a = create_model("biolek", &ParamOverrides::new()).unwrap();
        let mut b = a.clone();
        let trace = record(&mut a, &times, &voltages, 1e-7);
        assert_eq!(trace.currents(), simulate(&mut b, &voltages, 1e-7));
        assert_eq!(a.state(), b.state());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not sample-aligned")]
    fn record_rejects_misaligned_inputs() {
        let mut model = create_model("linear", &ParamOverrides::new()).unwrap();
        record(&mut model, &[0.0, 1e-7, 2e-7], &[0.1, 0.2], 1e-7);
    }

    #[test]
    fn checked_run_reports_degenerate_resistance() {
        let params = DriftParams { r_on: 0.0, r_off: 0.0, ..DriftParams::default() };
        let mut model = LinearIonDrift::new(params);
        let err = simulate_checked(&mut model, &[1.0, 1.0], 1e-9).unwrap_err();
        assert!(matches!(err, SimError::NumericInstability { step: 0, .. }));

        // the permissive driver lets it through
        let mut model = LinearIonDrift::new(params);
        let currents = simulate(&mut model, &[1.0], 1e-9);
        assert!(currents[0].is_infinite());
    }

    #[test]
    fn csv_has_header_and_one_row_per_sample() {
        let config = SimulationConfig { duration: 1e-6, dt: 1e-7, ..SimulationConfig::default() };
        let trace = run(&config).unwrap();
        let mut buf = Vec::new();
        trace.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("time,voltage,current,state,memristance"));
        assert_eq!(lines.count(), trace.len());
    }

    #[test]
    fn strict_run_rejects_unknown_waveform() {
        let config = SimulationConfig {
            waveform: "bogus".into(),
            strict: true,
            ..SimulationConfig::default()
        };
        assert!(matches!(run(&config), Err(SimError::UnknownWaveform(_))));

        let lenient = SimulationConfig { strict: false, ..config };
        assert!(run(&lenient).is_ok());
    }
}
