use serde::{Deserialize, Serialize};

use super::{saturate, MemristorModel};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YakopcicParams {
    /// Current scale for positive bias.
    pub a1: f64,
    /// Current scale for negative bias.
    pub a2: f64,
    pub b: f64,
    /// Positive programming threshold U_p (V).
    pub u_p: f64,
    /// Negative programming threshold magnitude U_n (V).
    pub u_n: f64,
    /// Programming rate magnitude A_p (1/s).
    pub a_p: f64,
    /// Programming rate magnitude A_n (1/s).
    pub a_n: f64,
    pub x_p: f64,
    pub x_n: f64,
    pub alpha_p: f64,
    pub alpha_n: f64,
    /// Lower state bound, keeps the device conductive.
    pub x_on: f64,
    pub initial: Option<f64>,
}

impl Default for YakopcicParams {
    fn default() -> Self {
        YakopcicParams {
            a1: 0.17,
            a2: 0.17,
            b: 0.05,
            u_p: 0.16,
            u_n: 0.15,
            a_p: 4000.0,
            a_n: 4000.0,
            x_p: 0.3,
            x_n: 0.5,
            alpha_p: 1.0,
            alpha_n: 5.0,
            x_on: 0.01,
            initial: None,
        }
    }
}

impl YakopcicParams {
    // threshold drive g(u)
    pub fn drive(&self, u: f64) -> f64 {
        if u > self.u_p {
            self.a_p * (u.exp() - self.u_p.exp())
        } else if u < -self.u_n {
            -self.a_n * ((-u).exp() - self.u_n.exp())
        } else {
            0.0
        }
    }

    // decays to zero as x -> 1
    pub fn f_p(&self, x: f64) -> f64 {
        if x >= self.x_p {
            let w = (self.x_p - x) / (1.0 - self.x_p) + 1.0;
            (-self.alpha_p * (x - self.x_p)).exp() * w
        } else {
            1.0
        }
    }

    // decays to zero as x -> 0
    pub fn f_n(&self, x: f64) -> f64 {
        if x <= 1.0 - self.x_n {
            let w = x / (1.0 - self.x_n);
            (self.alpha_n * (x + self.x_n - 1.0)).exp() * w
        } else {
            1.0
        }
    }

    pub fn derivative(&self, x: f64, u: f64) -> f64 {
        let f = if u >= 0.0 { self.f_p(x) } else { self.f_n(x) };
        self.drive(u) * f
    }
}

#[derive(Debug, Clone)]
pub struct Yakopcic {
    params: YakopcicParams,
    x: f64,
    g: f64,
}

impl Yakopcic {
    pub fn new(params: YakopcicParams) -> Self {
        let mut dev = Yakopcic { params, x: 0.0, g: 0.0 };
        dev.set_state(params.initial.unwrap_or(params.x_on));
        dev
    }

    pub fn params(&self) -> &YakopcicParams {
        &self.params
    }

    fn set_state(&mut self, x: f64) {
        let p = &self.params;
        self.x = saturate(x, p.x_on, 1.0);
        self.g = p.a1 * self.x * p.b.sinh();
    }
}

impl MemristorModel for Yakopcic {
    // asymmetric sinh readout, not v / M
    fn current(&self, u: f64) -> f64 {
        let p = &self.params;
        let a = if u >= 0.0 { p.a1 } else { p.a2 };
        a * self.x * (p.b * u).sinh()
    }

    fn advance(&mut self, u: f64, dt: f64) {
        let dx = self.params.derivative(self.x, u);
        self.set_state(self.x + dx * dt);
    }

    fn state(&self) -> f64 {
        self.x
    }

    fn domain(&self) -> (f64, f64) {
        (self.params.x_on, 1.0)
    }

    fn memristance(&self) -> f64 {
        1.0 / self.g
    }

    fn conductance(&self) -> f64 {
        self.g
    }
}
