// Ionic drift family: linear HP model plus the Biolek and Joglekar window variants.
// All three share the state w in [0, D] and the linear memristance mix.

use serde::{Deserialize, Serialize};

use super::{saturate, MemristorModel};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftParams {
    /// Dopant mobility μᵥ (m²·s⁻¹·V⁻¹).
    pub mu_v: f64,
    /// Device thickness D (m).
    pub d: f64,
    pub r_on: f64,
    pub r_off: f64,
    /// Initial dopant front position; midpoint D/2 when absent.
    pub initial: Option<f64>,
}

impl Default for DriftParams {
    fn default() -> Self {
        DriftParams { mu_v: 1e-9, d: 1e-8, r_on: 100.0, r_off: 16e3, initial: None }
    }
}

impl DriftParams {
    pub fn memristance(&self, w: f64) -> f64 {
        let x = w / self.d;
        self.r_on * x + self.r_off * (1.0 - x)
    }

    // dw/dt without a window
    fn drift_rate(&self, i: f64) -> f64 {
        self.mu_v * (self.r_on / self.d) * i
    }

    fn initial_state(&self) -> f64 {
        self.initial.unwrap_or(self.d / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowedDriftParams {
    #[serde(flatten)]
    pub drift: DriftParams,
    /// Window exponent p; the window raises to the even power 2p.
    pub p: u32,
}

impl Default for WindowedDriftParams {
    fn default() -> Self {
        WindowedDriftParams { drift: DriftParams::default(), p: 1 }
    }
}

// Shared state holder so the three variants only differ in their window.
#[derive(Debug, Clone)]
struct DriftState {
    params: DriftParams,
    w: f64,
    m: f64,
}

impl DriftState {
    fn new(params: DriftParams) -> Self {
        let mut s = DriftState { params, w: 0.0, m: 0.0 };
        s.set_state(params.initial_state());
        s
    }

    fn set_state(&mut self, w: f64) {
        self.w = saturate(w, 0.0, self.params.d);
        self.m = self.params.memristance(self.w);
    }

    fn current(&self, v: f64) -> f64 {
        v / self.m
    }

    fn step(&mut self, v: f64, dt: f64, window: impl Fn(f64, f64) -> f64) {
        let i = self.current(v);
        let x = self.w / self.params.d;
        let dw = self.params.drift_rate(i) * window(x, i);
        self.set_state(self.w + dw * dt);
    }
}

/// HP linear ion drift model, no boundary window.
#[derive(Debug, Clone)]
pub struct LinearIonDrift {
    inner: DriftState,
}

impl LinearIonDrift {
    pub fn new(params: DriftParams) -> Self {
        LinearIonDrift { inner: DriftState::new(params) }
    }

    pub fn params(&self) -> &DriftParams {
        &self.inner.params
    }
}

impl MemristorModel for LinearIonDrift {
    fn current(&self, v: f64) -> f64 {
        self.inner.current(v)
    }

    fn advance(&mut self, v: f64, dt: f64) {
        self.inner.step(v, dt, |_, _| 1.0);
    }

    fn state(&self) -> f64 {
        self.inner.w
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.inner.params.d)
    }

    fn memristance(&self) -> f64 {
        self.inner.m
    }
}

/// Biolek window: 1 - (x - step(-i))^2p, depends on current direction.
pub fn biolek_window(x: f64, i: f64, p: u32) -> f64 {
    let stp = if -i >= 0.0 { 1.0 } else { 0.0 };
    1.0 - (x - stp).powi(2 * p as i32)
}

/// Joglekar window: 1 - (2x - 1)^2p.
pub fn joglekar_window(x: f64, p: u32) -> f64 {
    1.0 - (2.0 * x - 1.0).powi(2 * p as i32)
}

#[derive(Debug, Clone)]
pub struct Biolek {
    inner: DriftState,
    p: u32,
}

impl Biolek {
    pub fn new(params: WindowedDriftParams) -> Self {
        Biolek { inner: DriftState::new(params.drift), p: params.p }
    }
}

impl MemristorModel for Biolek {
    fn current(&self, v: f64) -> f64 {
        self.inner.current(v)
    }

    fn advance(&mut self, v: f64, dt: f64) {
        let p = self.p;
        self.inner.step(v, dt, |x, i| biolek_window(x, i, p));
    }

    fn state(&self) -> f64 {
        self.inner.w
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.inner.params.d)
    }

    fn memristance(&self) -> f64 {
        self.inner.m
    }
}

#[derive(Debug, Clone)]
pub struct Joglekar {
    inner: DriftState,
    p: u32,
}

impl Joglekar {
    pub fn new(params: WindowedDriftParams) -> Self {
        Joglekar { inner: DriftState::new(params.drift), p: params.p }
    }
}

impl MemristorModel for Joglekar {
    fn current(&self, v: f64) -> f64 {
        self.inner.current(v)
    }

    fn advance(&mut self, v: f64, dt: f64) {
        let p = self.p;
        self.inner.step(v, dt, |x, _| joglekar_window(x, p));
    }

    fn state(&self) -> f64 {
        self.inner.w
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.inner.params.d)
    }

    fn memristance(&self) -> f64 {
        self.inner.m
    }
}
