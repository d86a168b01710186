use tracing::{debug, info, warn};

use crate::config::LanderConfig;
use crate::dynamics::body::RigidBody;
use crate::dynamics::state::StateVector;
use crate::error::Result;
use crate::gnc::model;
use crate::gnc::{ControlLoop, LinearStateSpaceModel, LoopState, LqrController, ObserverController};
use crate::io::hud::HudReadout;
use super::driver::{RocketDriver, ThrusterEffects};
use super::event::{EventDetector, EventKind, LandingOutcome, LoopKind, ResetReason, SimEvent, WorldBoundDetector};
use super::input::InputSource;

// ---------------------------------------------------------------------------
// Landing-safety latch
// ---------------------------------------------------------------------------

/// Re-evaluated at the end of every fixed tick, read on collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightStatus {
    pub is_safe_to_land: bool,
    pub vertical_speed: f64, // m/s
}

// ---------------------------------------------------------------------------
// Simulation: one rocket, its driver, models and correction loops
// ---------------------------------------------------------------------------

/// Owns everything a run needs and advances it one fixed tick at a time.
///
/// Per tick, in order: reset key, thrust from held keys, speed clamps, the
/// observer and LQR correction loops, the body's own integrator, the
/// landing-safety latch, then the lower world bound.
pub struct Simulation<B: RigidBody> {
    config: LanderConfig,
    body: B,
    driver: RocketDriver,
    plant: LinearStateSpaceModel,
    observer: ControlLoop<ObserverController>,
    lqr: ControlLoop<LqrController>,
    status: FlightStatus,
    world_bound: WorldBoundDetector,
    time: f64,
    ticks: u64,
}

impl<B: RigidBody> Simulation<B> {
    /// Assemble a run. Fails on invalid configuration or a missing engine.
    pub fn new(config: LanderConfig, body: B, effects: ThrusterEffects) -> Result<Self> {
        config.validate()?;
        let driver = RocketDriver::new(&config, body.center_of_mass(), effects)?;
        let plant = model::linearized_plant(&config.engines, body.mass(), body.inertia())?;
        debug!("linearized plant:\n{plant}");

        let observer = ControlLoop::new(ObserverController::new()?)?;
        let lqr = ControlLoop::new(LqrController::new()?)?;
        let status = FlightStatus {
            is_safe_to_land: driver.safe_to_land(&body),
            vertical_speed: body.velocity().y,
        };
        let world_bound = WorldBoundDetector {
            lower_bound: config.world.lower_world_bound,
        };

        info!(
            dt = config.world.fixed_dt,
            mass = body.mass(),
            inertia = body.inertia(),
            "simulation assembled"
        );

        Ok(Self {
            config,
            body,
            driver,
            plant,
            observer,
            lqr,
            status,
            world_bound,
            time: 0.0,
            ticks: 0,
        })
    }

    pub fn config(&self) -> &LanderConfig {
        &self.config
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn driver(&self) -> &RocketDriver {
        &self.driver
    }

    pub fn plant(&self) -> &LinearStateSpaceModel {
        &self.plant
    }

    pub fn observer(&self) -> &ControlLoop<ObserverController> {
        &self.observer
    }

    pub fn lqr(&self) -> &ControlLoop<LqrController> {
        &self.lqr
    }

    pub fn status(&self) -> FlightStatus {
        self.status
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn state(&self) -> StateVector {
        StateVector::from_body(&self.body)
    }

    // -----------------------------------------------------------------------
    // Button entry points
    // -----------------------------------------------------------------------

    /// Start the observer loop. No-op while it is already running.
    pub fn activate_observer_controller(&mut self) -> bool {
        debug!(state = %self.state(), "observer requested");
        self.observer.activate()
    }

    /// Start the LQR loop. No-op while it is already running.
    pub fn activate_lqr_controller(&mut self) -> bool {
        info!(state = %self.state(), "activating LQR controller");
        self.lqr.activate()
    }

    /// Ask both loops to stop at their next tick.
    pub fn cancel_controllers(&mut self) {
        self.observer.cancel();
        self.lqr.cancel();
    }

    // -----------------------------------------------------------------------
    // Fixed tick
    // -----------------------------------------------------------------------

    /// Advance one fixed physics step and report what happened.
    pub fn fixed_update(&mut self, input: &dyn InputSource) -> Vec<SimEvent> {
        let dt = self.config.world.fixed_dt;
        let prev = self.state();
        let mut events = Vec::new();

        if input.held(self.config.controls.reset) {
            events.push(self.event(EventKind::ResetRequested(ResetReason::ResetKey)));
        }

        self.driver.apply_input(&mut self.body, input, dt);
        self.driver.clamp(&mut self.body);

        let was = self.observer.state();
        let now = self.observer.tick(&mut self.body, &self.config.physics, dt);
        if let Some(kind) = loop_transition(LoopKind::Observer, was, now) {
            events.push(self.event(kind));
        }

        let was = self.lqr.state();
        let now = self.lqr.tick(&mut self.body, &self.config.physics, dt);
        if let Some(kind) = loop_transition(LoopKind::Lqr, was, now) {
            events.push(self.event(kind));
        }

        self.body.step(dt);
        self.time += dt;
        self.ticks += 1;

        self.status = FlightStatus {
            is_safe_to_land: self.driver.safe_to_land(&self.body),
            vertical_speed: self.body.velocity().y,
        };

        let current = self.state();
        if let Some(kind) = self.world_bound.check(&prev, &current) {
            debug!(y = current.y(), "below lower world bound");
            events.push(self.event(kind));
        }

        events
    }

    /// Render-rate work: thruster effects and the HUD.
    pub fn frame_update(&mut self, input: &dyn InputSource) -> HudReadout {
        self.driver.update_effects(input);
        HudReadout::from_body(&self.body)
    }

    /// The rocket touched something. Outcome comes from the last latch.
    pub fn on_collision(&mut self) -> SimEvent {
        let outcome = if self.status.is_safe_to_land {
            info!(vy = self.status.vertical_speed, "landed safely");
            LandingOutcome::Safe
        } else {
            warn!(vy = self.status.vertical_speed, "crashed");
            LandingOutcome::Crashed
        };
        self.event(EventKind::Landed(outcome))
    }

    /// Snap straight to `angle` degrees and stop spinning.
    ///
    /// Logs the plant and one autonomous prediction first. The prediction is
    /// not applied.
    pub fn snap_rotation(&mut self, angle: f64) -> Result<StateVector> {
        info!(angle, "setting rotation");
        debug!("plant model:\n{}\ncurrent state: {}", self.plant, self.state());
        let predicted = self.observer.predict(&self.state(), self.config.world.fixed_dt)?;
        debug!(state = %predicted, "state after one step");
        self.body.set_rotation(angle);
        self.body.set_angular_velocity(0.0);
        Ok(predicted)
    }

    /// Start over with a fresh body, keeping configuration and models.
    pub fn restart(&mut self, body: B) {
        self.body = body;
        self.observer.reset();
        self.lqr.reset();
        self.status = FlightStatus {
            is_safe_to_land: self.driver.safe_to_land(&self.body),
            vertical_speed: self.body.velocity().y,
        };
        self.time = 0.0;
        self.ticks = 0;
        info!("simulation restarted");
    }

    fn event(&self, kind: EventKind) -> SimEvent {
        SimEvent {
            time: self.time,
            kind,
            state: self.state(),
        }
    }
}

fn loop_transition(kind: LoopKind, was: LoopState, now: LoopState) -> Option<EventKind> {
    match (was, now) {
        (LoopState::Running, LoopState::Converged) => Some(EventKind::ControllerConverged(kind)),
        (LoopState::Running, LoopState::Idle) => Some(EventKind::ControllerCancelled(kind)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
