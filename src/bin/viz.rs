use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};
use nalgebra::{Vector2, Vector3};

use rocket_lander::config::LanderConfig;
use rocket_lander::dynamics::{Body2D, StateVector};
use rocket_lander::sim::pendulum::Pendulum;
use rocket_lander::sim::trajectory::TrajectoryPlotter;
use rocket_lander::sim::{InputState, Simulation, ThrusterEffects};

const TILT_DEG: f64 = 30.0;
const RUN_TICKS: usize = 150;

fn main() -> eframe::Result {
    let observer = correction_run(false);
    let lqr = correction_run(true);

    let mut pendulum = Pendulum::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(2.0, 2.0, 0.0), 1.0);
    // 60 Hz render frames for 6 s
    let bob_path: Vec<[f64; 2]> = (0..360)
        .map(|_| {
            let p = pendulum.advance(1.0 / 60.0);
            [p.x, p.y]
        })
        .collect();

    let preview = TrajectoryPlotter::default().plot(Vector2::new(0.0, 0.0), Vector2::new(5.0, 8.0));

    let app = LanderViz { observer, lqr, bob_path, preview };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Rocket Lander", options, Box::new(|_| Ok(Box::new(app))))
}

struct Run {
    samples: Vec<(f64, StateVector)>,
    converged_at: Option<f64>,
}

/// Weightless rocket tilted by `TILT_DEG`, one correction loop active.
fn correction_run(lqr: bool) -> Run {
    let mut config = LanderConfig::default();
    config.world.gravity = [0.0, 0.0];
    let mut body = Body2D::from_config(&config.body, config.world.gravity());
    body.rotation = TILT_DEG;

    let mut samples = Vec::with_capacity(RUN_TICKS + 1);
    let mut converged_at = None;
    let Ok(mut sim) = Simulation::new(config, body, ThrusterEffects::none()) else {
        return Run { samples, converged_at };
    };
    if lqr {
        sim.activate_lqr_controller();
    } else {
        sim.activate_observer_controller();
    }

    let idle = InputState::new();
    samples.push((0.0, sim.state()));
    for _ in 0..RUN_TICKS {
        let events = sim.fixed_update(&idle);
        if converged_at.is_none() && events.iter().any(|e| e.kind.converged_loop().is_some()) {
            converged_at = Some(sim.time());
        }
        samples.push((sim.time(), sim.state()));
    }
    Run { samples, converged_at }
}

struct LanderViz {
    observer: Run,
    lqr: Run,
    bob_path: Vec<[f64; 2]>,
    preview: Vec<Vector2<f64>>,
}

impl eframe::App for LanderViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Attitude correction from {TILT_DEG:.0} deg"));
            let fmt = |t: Option<f64>| t.map_or("not converged".to_string(), |t| format!("{t:.2} s"));
            ui.label(format!(
                "Observer: {}  |  LQR: {}  |  Pendulum frames: {}",
                fmt(self.observer.converged_at),
                fmt(self.lqr.converged_at),
                self.bob_path.len(),
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Rotation vs Time
                ui.vertical(|ui| {
                    ui.label("Rotation (deg)");
                    let obs: PlotPoints = self.observer.samples.iter()
                        .map(|(t, s)| [*t, s.theta_degrees()])
                        .collect();
                    let lqr: PlotPoints = self.lqr.samples.iter()
                        .map(|(t, s)| [*t, s.theta_degrees()])
                        .collect();
                    Plot::new("rotation")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Observer", obs));
                            plot_ui.line(Line::new("LQR", lqr));
                        });
                });

                // Angular velocity vs Time
                ui.vertical(|ui| {
                    ui.label("Angular velocity (deg/s)");
                    let obs: PlotPoints = self.observer.samples.iter()
                        .map(|(t, s)| [*t, s.omega()])
                        .collect();
                    let lqr: PlotPoints = self.lqr.samples.iter()
                        .map(|(t, s)| [*t, s.omega()])
                        .collect();
                    Plot::new("omega")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Observer", obs));
                            plot_ui.line(Line::new("LQR", lqr));
                        });
                });
            });

            ui.horizontal(|ui| {
                // Pendulum bob path
                ui.vertical(|ui| {
                    ui.label("Pendulum bob (m)");
                    let points: PlotPoints = self.bob_path.iter().copied().collect();
                    Plot::new("pendulum")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("x (m)")
                        .data_aspect(1.0)
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Bob", points));
                        });
                });

                // Ballistic preview
                ui.vertical(|ui| {
                    ui.label("Trajectory preview (m)");
                    let points: PlotPoints = self.preview.iter()
                        .map(|p| [p.x, p.y])
                        .collect();
                    Plot::new("preview")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("x (m)")
                        .data_aspect(1.0)
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Preview", points));
                        });
                });
            });
        });
    }
}
