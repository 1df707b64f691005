//! Memristor device models driven by a fixed-step forward Euler integrator.
//!
//! A run pairs a voltage waveform with one freshly built device model and
//! steps through it sample by sample, reading the current on the pre-update
//! state and then advancing the internal state variable. The result is the
//! current trace behind the pinched I-V hysteresis loop.
//!
//! ```
//! use memristor_dynamics::{create_model, generate_waveform, simulate, time_vector, ParamOverrides};
//!
//! let mut model = create_model("biolek", &ParamOverrides::new()).unwrap();
//! let t = time_vector(2e-4, 1e-7);
//! let v = generate_waveform("sine", &t, 1e4, 1.0);
//! let i = simulate(&mut model, &v, 1e-7);
//! assert_eq!(i.len(), v.len());
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod sim;
pub mod waveform;

pub use config::SimulationConfig;
pub use error::{SimError, SimResult};
pub use models::{create_model, Memristor, MemristorModel, ModelKind, ModelParams, ParamOverrides};
pub use sim::{record, run, simulate, simulate_checked, Sample, Trace};
pub use waveform::{generate, generate_waveform, step_count, time_vector, WaveformFamily};
