use eframe::egui;
use memristor_dynamics::{run, ModelKind, SimulationConfig, Trace, WaveformFamily};

// Largest run the plot is asked to hold. T and dt are edited independently,
// so their ratio is checked here rather than through the slider ranges.
const MAX_SAMPLES: usize = 1_000_000;

// Application context: owns the run description and the last result. Every
// control edit marks it dirty and the next frame re-runs the simulation.
struct SimulatorApp {
    config: SimulationConfig,
    model: ModelKind,
    waveform: WaveformFamily,
    duration_us: f64,
    dt_us: f64,
    trace: Option<Trace>,
    error: Option<String>,
    dirty: bool,
}

impl Default for SimulatorApp {
    fn default() -> Self {
        let config = SimulationConfig::default();
        Self {
            model: ModelKind::Linear,
            waveform: WaveformFamily::Sine,
            duration_us: config.duration * 1e6,
            dt_us: config.dt * 1e6,
            config,
            trace: None,
            error: None,
            dirty: true,
        }
    }
}

impl SimulatorApp {
    fn rerun(&mut self) {
        self.config.model = self.model.to_string();
        self.config.waveform = self.waveform.to_string();
        self.config.duration = self.duration_us * 1e-6;
        self.config.dt = self.dt_us * 1e-6;
        self.dirty = false;

        let steps = self.config.step_count();
        if steps > MAX_SAMPLES {
            tracing::warn!(steps, limit = MAX_SAMPLES, "run too large, skipped");
            self.trace = None;
            self.error = Some(format!(
                "T / dt gives {steps} samples, more than the {MAX_SAMPLES} limit; raise dt or shorten T"
            ));
            return;
        }

        match run(&self.config) {
            Ok(trace) => {
                self.trace = Some(trace);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("simulation failed: {e}");
                self.trace = None;
                self.error = Some(e.to_string());
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;

        egui::ComboBox::from_label("Model")
            .selected_text(self.model.to_string())
            .show_ui(ui, |ui| {
                for kind in ModelKind::ALL {
                    changed |= ui.selectable_value(&mut self.model, kind, kind.name()).changed();
                }
            });
        egui::ComboBox::from_label("Waveform")
            .selected_text(self.waveform.to_string())
            .show_ui(ui, |ui| {
                for family in WaveformFamily::ALL {
                    changed |= ui.selectable_value(&mut self.waveform, family, family.name()).changed();
                }
            });

        ui.separator();
        changed |= ui
            .add(egui::DragValue::new(&mut self.config.frequency).speed(10.0).prefix("f = ").suffix(" Hz"))
            .changed();
        changed |= ui
            .add(egui::DragValue::new(&mut self.config.amplitude).speed(0.01).prefix("A = ").suffix(" V"))
            .changed();
        changed |= ui
            .add(egui::DragValue::new(&mut self.duration_us).speed(1.0).clamp_range(1.0..=1e6).prefix("T = ").suffix(" µs"))
            .changed();
        changed |= ui
            .add(egui::DragValue::new(&mut self.dt_us).speed(0.01).clamp_range(1e-4..=10.0).prefix("dt = ").suffix(" µs"))
            .changed();
        changed |= ui.checkbox(&mut self.config.strict, "Strict").changed();

        if changed {
            self.dirty = true;
            ui.ctx().request_repaint();
        }

        ui.separator();
        if let Some(err) = &self.error {
            ui.colored_label(egui::Color32::RED, err.as_str());
        } else if let Some(trace) = &self.trace {
            ui.label(format!("{} samples", trace.len()));
            if let Some(last) = trace.samples.last() {
                ui.monospace(format!("state  {:.4e}", last.state));
                ui.monospace(format!("M      {:.2} Ω", last.memristance));
            }
        }
    }

    // Draws current against voltage, scaled to fill the available rect.
    fn iv_plot(&self, ui: &mut egui::Ui) {
        let size = ui.available_size();
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let rect = response.rect;
        painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, egui::Color32::GRAY));

        let Some(trace) = &self.trace else { return };
        let finite: Vec<_> = trace
            .samples
            .iter()
            .filter(|s| s.voltage.is_finite() && s.current.is_finite())
            .collect();
        if finite.len() < 2 {
            return;
        }
        let v_max = finite.iter().map(|s| s.voltage.abs()).fold(f64::MIN_POSITIVE, f64::max);
        let i_max = finite.iter().map(|s| s.current.abs()).fold(f64::MIN_POSITIVE, f64::max);

        let points: Vec<egui::Pos2> = finite
            .iter()
            .map(|s| {
                let x = egui::emath::remap(s.voltage, -v_max..=v_max, rect.left() as f64..=rect.right() as f64);
                let y = egui::emath::remap(s.current, -i_max..=i_max, rect.bottom() as f64..=rect.top() as f64);
                egui::pos2(x as f32, y as f32)
            })
            .collect();

        let axis = egui::Stroke::new(0.5, egui::Color32::DARK_GRAY);
        painter.line_segment([egui::pos2(rect.left(), rect.center().y), egui::pos2(rect.right(), rect.center().y)], axis);
        painter.line_segment([egui::pos2(rect.center().x, rect.top()), egui::pos2(rect.center().x, rect.bottom())], axis);
        painter.add(egui::Shape::line(points, egui::Stroke::new(1.5, egui::Color32::LIGHT_BLUE)));
        painter.text(
            rect.left_top() + egui::vec2(6.0, 6.0),
            egui::Align2::LEFT_TOP,
            format!("|V| ≤ {:.3} V   |I| ≤ {:.3e} A", v_max, i_max),
            egui::FontId::monospace(12.0),
            ui.visuals().text_color(),
        );
    }
}

impl eframe::App for SimulatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.dirty {
            self.rerun();
        }
        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Memristor Simulator");
            self.controls(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.iv_plot(ui);
        });
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Memristor Simulator",
        native_options,
        Box::new(|_cc| Box::new(SimulatorApp::default())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_run_is_refused() {
        let mut app = SimulatorApp { duration_us: 1e6, dt_us: 1e-4, ..SimulatorApp::default() };
        app.rerun();
        assert!(app.trace.is_none());
        assert!(app.error.as_deref().is_some_and(|e| e.contains("limit")));
        assert!(!app.dirty);

        assert!(app.config.step_count() > MAX_SAMPLES);

        app.dt_us = 1.0;
        app.duration_us = 500.0;
        app.rerun();
        let trace = app.trace.as_ref().expect("small run is plotted");
        assert_eq!(trace.len(), app.config.step_count());
        assert!(!trace.is_empty());
        assert!(app.error.is_none());
    }
}
