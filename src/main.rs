use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rocket_lander::config::LanderConfig;
use rocket_lander::dynamics::Body2D;
use rocket_lander::io::{write_summary_file, write_trajectory_file, FlightSummary, PositionLogger, Sample};
use rocket_lander::sim::event::{EventDetector, EventKind, SimEvent, TouchdownDetector};
use rocket_lander::sim::spawn::spawn_point;
use rocket_lander::sim::{InputState, Key, Simulation, ThrusterEffects};

#[derive(Parser, Debug)]
#[command(name = "rocket-lander")]
#[command(about = "Headless 2D rocket landing run with observer / LQR attitude correction")]
#[command(version)]
struct Args {
    /// JSON configuration; missing fields take defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Correction loop started at spawn
    #[arg(long, value_enum, default_value = "lqr")]
    controller: ControllerChoice,

    /// Initial tilt, degrees
    #[arg(long, default_value_t = 30.0)]
    tilt: f64,

    /// Descent speed the scripted burn tries to hold, m/s
    #[arg(long, default_value_t = 8.0)]
    target_descent: f64,

    /// Seed for the spawn point (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,

    /// Full-state trajectory CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Run summary JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Sampled position log (t,XPos,YPos), 5 Hz for 10 s
    #[arg(long)]
    positions: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ControllerChoice {
    None,
    Observer,
    Lqr,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => LanderConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => LanderConfig::default(),
    };

    // -----------------------------------------------------------------------
    // Spawn
    // -----------------------------------------------------------------------
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let spawn = spawn_point(&config.spawn, &mut rng);
    let mut body = Body2D::from_config(&config.body, config.world.gravity());
    body.set_position(spawn);
    body.rotation = args.tilt;

    let dt = config.world.fixed_dt;
    let (mass, inertia) = (config.body.mass, config.body.inertia);
    let mut sim = Simulation::new(config, body, ThrusterEffects::none())?;
    info!(x = spawn.x, y = spawn.y, tilt = args.tilt, "spawned");

    match args.controller {
        ControllerChoice::Observer => {
            sim.activate_observer_controller();
        }
        ControllerChoice::Lqr => {
            sim.activate_lqr_controller();
        }
        ControllerChoice::None => {}
    }

    let mut positions = match &args.positions {
        Some(path) => Some(PositionLogger::new(BufWriter::new(File::create(path)?), 10, 5)?),
        None => None,
    };

    // -----------------------------------------------------------------------
    // Run: scripted main-engine burn until touchdown or reset
    // -----------------------------------------------------------------------
    let mut input = InputState::new();
    let mut touchdown = TouchdownDetector::new(0.0);
    let mut trajectory = vec![Sample { time: 0.0, state: sim.state() }];
    let mut events: Vec<SimEvent> = Vec::new();

    while sim.ticks() < args.max_ticks {
        let prev = sim.state();
        input.set(Key::Space, prev.vy() < -args.target_descent);

        let tick_events = sim.fixed_update(&input);
        input.end_frame();
        let reset = tick_events
            .iter()
            .any(|e| matches!(e.kind, EventKind::ResetRequested(_)));
        events.extend(tick_events);

        let current = sim.state();
        trajectory.push(Sample { time: sim.time(), state: current });
        if let Some(logger) = positions.as_mut() {
            logger.observe(sim.time(), sim.body().position)?;
        }

        if let Some(kind) = touchdown.check(&prev, &current) {
            events.push(SimEvent { time: sim.time(), kind, state: current });
            events.push(sim.on_collision());
            break;
        }
        if reset {
            break;
        }
    }

    let hud = sim.frame_update(&input);
    let summary = FlightSummary::from_samples(&trajectory, &events)
        .context("run recorded no samples")?;

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  ROCKET LANDING RUN");
    println!("====================================================================");
    println!();
    println!("  Setup");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mass:          {:>8.2} kg    Inertia:      {:>8.2} kg m^2",
        mass, inertia
    );
    println!(
        "  Spawn x:       {:>8.1} m     Spawn height: {:>8.1} m",
        spawn.x, spawn.y
    );
    println!(
        "  Tilt:          {:>8.1} deg   Controller:   {:?}",
        args.tilt, args.controller
    );
    println!("  Fixed dt:      {:>8.3} s", dt);
    println!();

    println!("  Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for e in &events {
        println!(
            "  t={:>7.2}s   y={:>8.1}m   vy={:>7.2}m/s   rot={:>7.2}deg   {:?}",
            e.time,
            e.state.y(),
            e.state.vy(),
            e.state.theta_degrees(),
            e.kind
        );
    }
    println!();

    println!("  Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Max height:    {:>8.1} m", summary.max_height);
    println!("  Max descent:   {:>8.2} m/s", summary.max_descent_speed);
    println!("  Final vy:      {:>8.2} m/s", summary.final_vertical_speed);
    println!("  Final angle:   {:>8.2} deg", summary.final_rotation_deg);
    println!("  Flight time:   {:>8.2} s", summary.flight_time);
    match summary.outcome {
        Some(outcome) => println!("  Outcome:       {:?}", outcome),
        None => println!("  Outcome:       no touchdown"),
    }
    println!("  HUD:           {}", hud);
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>9}  {:>9}",
        "t (s)", "x (m)", "y (m)", "vy (m/s)", "rot (deg)"
    );
    println!("  {}", "─".repeat(52));

    let sample_interval = (trajectory.len() / 30).max(1);
    for (i, s) in trajectory.iter().enumerate() {
        if i % sample_interval != 0 && i != trajectory.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.2}  {:>9.1}  {:>9.1}  {:>9.2}  {:>9.2}",
            s.time,
            s.state.x(),
            s.state.y(),
            s.state.vy(),
            s.state.theta_degrees()
        );
    }

    println!();
    println!("  Simulation: {} ticks, dt={} s", sim.ticks(), dt);
    println!("====================================================================");
    println!();

    // -----------------------------------------------------------------------
    // Exports
    // -----------------------------------------------------------------------
    if let Some(path) = &args.csv {
        write_trajectory_file(path, &trajectory)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "trajectory written");
    }
    if let Some(path) = &args.json {
        write_summary_file(path, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }
    if let Some(logger) = positions {
        logger.finish()?;
    }

    Ok(())
}
