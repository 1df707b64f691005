use serde::{Deserialize, Serialize};

use super::{saturate, MemristorModel};

/// Elementary charge (C).
const Q: f64 = 1.602_176_634e-19;
/// Boltzmann constant (J/K).
const K_B: f64 = 1.380_649e-23;

// Generalized metastable switch model. x is the fraction of switches in the ON state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MmsParams {
    /// Switching time constant τ (s).
    pub tau: f64,
    /// Device temperature (K).
    pub temperature: f64,
    pub u_on: f64,
    pub u_off: f64,
    pub r_on: f64,
    pub r_off: f64,
    pub initial: Option<f64>,
}

impl Default for MmsParams {
    fn default() -> Self {
        MmsParams {
            tau: 1e-4,
            temperature: 298.5,
            u_on: 0.27,
            u_off: 0.27,
            r_on: 500.0,
            r_off: 1500.0,
            initial: None,
        }
    }
}

impl MmsParams {
    pub fn conductance(&self, x: f64) -> f64 {
        x / self.r_on + (1.0 - x) / self.r_off
    }

    /// Switching probabilities (P_on, P_off) over one step of length `dt`.
    pub fn transition_probabilities(&self, v: f64, dt: f64) -> (f64, f64) {
        let alpha = dt / self.tau;
        let beta = Q / (K_B * self.temperature);
        let p_on = alpha / (1.0 + (-beta * (v - self.u_on)).exp());
        let p_off = alpha * (1.0 - 1.0 / (1.0 + (-beta * (v + self.u_off)).exp()));
        (p_on, p_off)
    }
}

#[derive(Debug, Clone)]
pub struct Mms {
    params: MmsParams,
    x: f64,
    g: f64,
}

impl Mms {
    pub fn new(params: MmsParams) -> Self {
        let mut dev = Mms { params, x: 0.0, g: 0.0 };
        dev.set_state(params.initial.unwrap_or(0.0));
        dev
    }

    pub fn params(&self) -> &MmsParams {
        &self.params
    }

    fn set_state(&mut self, x: f64) {
        self.x = saturate(x, 0.0, 1.0);
        self.g = self.params.conductance(self.x);
    }
}

impl MemristorModel for Mms {
    fn current(&self, v: f64) -> f64 {
        v * self.g
    }

    // Discrete population update; dt enters through α = dt/τ rather than a rate.
    fn advance(&mut self, v: f64, dt: f64) {
        let (p_on, p_off) = self.params.transition_probabilities(v, dt);
        self.set_state(self.x + p_on * (1.0 - self.x) - p_off * self.x);
    }

    fn state(&self) -> f64 {
        self.x
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn memristance(&self) -> f64 {
        1.0 / self.g
    }

    fn conductance(&self) -> f64 {
        self.g
    }
}
