use serde::{Deserialize, Serialize};

use super::{saturate, MemristorModel};

// Voltage ThrEshold Adaptive Memristor model. State is the gap w in [w_on, w_off];
// the device only moves once the applied voltage crosses u_off or u_on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VteamParams {
    pub r_on: f64,
    pub r_off: f64,
    pub w_on: f64,
    pub w_off: f64,
    /// Negative switching threshold (V).
    pub u_on: f64,
    /// Positive switching threshold (V).
    pub u_off: f64,
    /// Rate constant towards ON (m/s), usually negative.
    pub k_on: f64,
    /// Rate constant towards OFF (m/s).
    pub k_off: f64,
    pub alpha_on: f64,
    pub alpha_off: f64,
    pub a_on: f64,
    pub a_off: f64,
    /// Window width w_c (m).
    pub w_c: f64,
    pub initial: Option<f64>,
}

impl Default for VteamParams {
    fn default() -> Self {
        VteamParams {
            r_on: 50.0,
            r_off: 1000.0,
            w_on: 0.0,
            w_off: 3e-9,
            u_on: -0.3,
            u_off: 0.3,
            k_on: -1e-5,
            k_off: 1e-5,
            alpha_on: 3.0,
            alpha_off: 3.0,
            a_on: 0.0,
            a_off: 3e-9,
            w_c: 1e-10,
            initial: None,
        }
    }
}

impl VteamParams {
    // ln(R_off / R_on) / (w_off - w_on)
    fn lambda_per_width(&self) -> f64 {
        (self.r_off / self.r_on).ln() / (self.w_off - self.w_on)
    }

    pub fn f_off(&self, w: f64) -> f64 {
        (-((w - self.a_off) / self.w_c).exp()).exp()
    }

    pub fn f_on(&self, w: f64) -> f64 {
        (-(-(w - self.a_on) / self.w_c).exp()).exp()
    }

    pub fn derivative(&self, w: f64, u: f64) -> f64 {
        if self.u_off > 0.0 && u > self.u_off {
            self.k_off * (u / self.u_off - 1.0).powf(self.alpha_off) * self.f_off(w)
        } else if u < self.u_on && self.u_on < 0.0 {
            self.k_on * (u / self.u_on - 1.0).powf(self.alpha_on) * self.f_on(w)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vteam {
    params: VteamParams,
    w: f64,
    m: f64,
}

impl Vteam {
    pub fn new(params: VteamParams) -> Self {
        let w0 = params.initial.unwrap_or((params.w_on + params.w_off) / 2.0);
        let mut dev = Vteam { params, w: 0.0, m: 0.0 };
        dev.set_state(w0);
        dev
    }

    pub fn params(&self) -> &VteamParams {
        &self.params
    }

    fn set_state(&mut self, w: f64) {
        let p = &self.params;
        self.w = saturate(w, p.w_on, p.w_off);
        self.m = p.r_on * (p.lambda_per_width() * (self.w - p.w_on)).exp();
    }
}

impl MemristorModel for Vteam {
    fn current(&self, u: f64) -> f64 {
        let p = &self.params;
        (u / p.r_on) * (-p.lambda_per_width() * (self.w - p.w_on)).exp()
    }

    fn advance(&mut self, u: f64, dt: f64) {
        let dw = self.params.derivative(self.w, u);
        self.set_state(self.w + dw * dt);
    }

    fn state(&self) -> f64 {
        self.w
    }

    fn domain(&self) -> (f64, f64) {
        (self.params.w_on, self.params.w_off)
    }

    fn memristance(&self) -> f64 {
        self.m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_switching_step_matches_closed_form() {
        let p = VteamParams::default();
        let mut m = Vteam::new(p);
        let w0 = m.state();
        let (u, dt) = (1.0, 1e-5);
        m.advance(u, dt);

        let f_off = (-((w0 - p.a_off) / p.w_c).exp()).exp();
        let expected = w0 + p.k_off * (u / p.u_off - 1.0).powf(p.alpha_off) * f_off * dt;
        assert!(expected < p.w_off);
        assert_eq!(m.state(), expected);
    }

    #[test]
    fn on_switching_step_matches_closed_form() {
        let p = VteamParams::default();
        let mut m = Vteam::new(p);
        let w0 = m.state();
        let (u, dt) = (-1.0, 1e-5);
        m.advance(u, dt);

        let f_on = (-(-(w0 - p.a_on) / p.w_c).exp()).exp();
        let expected = w0 + p.k_on * (u / p.u_on - 1.0).powf(p.alpha_on) * f_on * dt;
        assert!(expected > p.w_on);
        assert_eq!(m.state(), expected);
    }

    #[test]
    fn no_motion_inside_threshold_band() {
        let mut m = Vteam::new(VteamParams::default());
        let w0 = m.state();
        for u in [-0.3, -0.1, 0.0, 0.2, 0.3] {
            m.advance(u, 1e-3);
        }
        assert_eq!(m.state(), w0);
    }

    #[test]
    fn memristance_spans_on_to_off() {
        let p = VteamParams::default();
        let at_on = Vteam::new(VteamParams { initial: Some(p.w_on), ..p });
        let at_off = Vteam::new(VteamParams { initial: Some(p.w_off), ..p });
        assert!((at_on.memristance() - p.r_on).abs() < 1e-9);
        assert!((at_off.memristance() - p.r_off).abs() < 1e-9);
    }

    #[test]
    fn current_agrees_with_memristance() {
        let m = Vteam::new(VteamParams::default());
        let i = m.current(0.7);
        assert!((i - 0.7 / m.memristance()).abs() < 1e-12);
    }

    #[test]
    fn positive_bias_drives_towards_off() {
        let mut m = Vteam::new(VteamParams::default());
        let (w0, r0) = (m.state(), m.memristance());
        m.advance(1.0, 1e-5);
        assert!(m.state() > w0);
        assert!(m.memristance() > r0);
    }

    #[test]
    fn negative_bias_drives_towards_on() {
        let mut m = Vteam::new(VteamParams::default());
        let w0 = m.state();
        m.advance(-1.0, 1e-5);
        assert!(m.state() < w0);
    }

    #[test]
    fn long_bias_saturates_at_w_off() {
        let mut m = Vteam::new(VteamParams::default());
        for _ in 0..10_000 {
            m.advance(2.0, 1e-3);
        }
        let (_, hi) = m.domain();
        assert!(m.state() <= hi);
        assert!(m.state() > 0.9 * hi);
    }
}
