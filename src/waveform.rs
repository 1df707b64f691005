//! Driving voltage waveforms.
//!
//! Every family is a pure function of time with period `1 / frequency` and
//! peak `amplitude`. Phase-based families wrap `ωt` into `[0, 2π)` first.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformFamily {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl WaveformFamily {
    pub const ALL: [WaveformFamily; 4] = [
        WaveformFamily::Sine,
        WaveformFamily::Square,
        WaveformFamily::Triangle,
        WaveformFamily::Sawtooth,
    ];

    /// Like `FromStr`, but anything unrecognized is a sine.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            WaveformFamily::Sine => "sine",
            WaveformFamily::Square => "square",
            WaveformFamily::Triangle => "triangle",
            WaveformFamily::Sawtooth => "sawtooth",
        }
    }

    /// Voltage at time `t`.
    pub fn value_at(self, t: f64, frequency: f64, amplitude: f64) -> f64 {
        let theta = TAU * frequency * t;
        match self {
            WaveformFamily::Sine => amplitude * theta.sin(),
            WaveformFamily::Square => amplitude * sign(theta.sin()),
            WaveformFamily::Triangle => {
                let phi = theta.rem_euclid(TAU);
                if phi < PI {
                    amplitude * (2.0 * phi / PI - 1.0)
                } else {
                    amplitude * (3.0 - 2.0 * phi / PI)
                }
            }
            WaveformFamily::Sawtooth => {
                let phi = theta.rem_euclid(TAU);
                amplitude * (phi / PI - 1.0)
            }
        }
    }
}

// signum with sign(0) = 0
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl fmt::Display for WaveformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveformFamily {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(WaveformFamily::Sine),
            "square" => Ok(WaveformFamily::Square),
            "triangle" => Ok(WaveformFamily::Triangle),
            "sawtooth" => Ok(WaveformFamily::Sawtooth),
            _ => Err(SimError::UnknownWaveform(s.to_string())),
        }
    }
}

/// Samples `family` at each of `times`.
pub fn generate(family: WaveformFamily, times: &[f64], frequency: f64, amplitude: f64) -> Vec<f64> {
    times
        .iter()
        .map(|&t| family.value_at(t, frequency, amplitude))
        .collect()
}

/// String-keyed entry point; unknown family names fall back to sine.
pub fn generate_waveform(family: &str, times: &[f64], frequency: f64, amplitude: f64) -> Vec<f64> {
    generate(WaveformFamily::parse_lenient(family), times, frequency, amplitude)
}

/// `floor(duration / dt)`, or 0 when that is negative or not finite.
pub fn step_count(duration: f64, dt: f64) -> usize {
    let steps_f = (duration / dt).floor();
    if steps_f.is_finite() && steps_f >= 0.0 { steps_f as usize } else { 0 }
}

/// Uniform grid `i * dt` for `i in 0..step_count(duration, dt)`.
pub fn time_vector(duration: f64, dt: f64) -> Vec<f64> {
    (0..step_count(duration, dt)).map(|i| i as f64 * dt).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_reaches_peak_at_quarter_period() {
        for (f, a) in [(1.0, 1.0), (50.0, 2.5), (1e4, -0.8)] {
            let v = generate_waveform("sine", &[0.0, 0.25 / f], f, a);
            assert_eq!(v, vec![0.0, a]);
        }
    }

    #[test]
    fn unknown_family_falls_back_to_sine() {
        let t = time_vector(2e-3, 1e-5);
        assert_eq!(
            generate_waveform("bogus", &t, 1e3, 1.2),
            generate_waveform("sine", &t, 1e3, 1.2)
        );
        assert!("bogus".parse::<WaveformFamily>().is_err());
    }

    #[test]
    fn square_is_zero_where_sine_is_zero() {
        let v = generate(WaveformFamily::Square, &[0.0, 0.25, 0.75], 1.0, 2.0);
        assert_eq!(v, vec![0.0, 2.0, -2.0]);
    }

    #[test]
    fn triangle_hits_corners() {
        let v = generate(WaveformFamily::Triangle, &[0.0, 0.25, 0.5, 0.75], 1.0, 1.0);
        let expected = [-1.0, 0.0, 1.0, 0.0];
        for (got, want) in v.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
    }

    #[test]
    fn sawtooth_ramps_and_resets() {
        let v = generate(WaveformFamily::Sawtooth, &[0.0, 0.5, 0.999, 1.0], 1.0, 1.0);
        assert!((v[0] + 1.0).abs() < 1e-12);
        assert!(v[1].abs() < 1e-12);
        assert!(v[2] > 0.99);
        assert!(v[3] < -0.99);
    }

    #[test]
    fn output_length_matches_input() {
        let t = time_vector(1.0, 0.01);
        for family in WaveformFamily::ALL {
            assert_eq!(generate(family, &t, 3.0, 1.0).len(), t.len());
        }
    }

    #[test]
    fn step_count_does_not_allocate() {
        assert_eq!(step_count(1.0, 1e-10), 10_000_000_000);
        assert_eq!(step_count(1.0, 0.0), 0);
        assert_eq!(step_count(f64::NAN, 1e-6), 0);
        assert_eq!(step_count(1.0, 0.25), time_vector(1.0, 0.25).len());
    }

    #[test]
    fn degenerate_time_vectors_are_empty() {
        assert!(time_vector(1.0, 0.0).is_empty());
        assert!(time_vector(-1.0, 0.1).is_empty());
        assert!(time_vector(1.0, -0.1).is_empty());
        assert_eq!(time_vector(1.0, 0.25), vec![0.0, 0.25, 0.5, 0.75]);
    }
}
