use tracing::{debug, info, warn};

use crate::config::PhysicsProperties;
use crate::dynamics::body::RigidBody;
use crate::dynamics::state::StateVector;
use crate::error::{LanderError, Result};
use crate::sim::integrator::predict;
use super::controller::Controller;

// ---------------------------------------------------------------------------
// Repeating correction loop, one tick per fixed physics step
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Converged,
}

/// Cooperative correction loop around a [`Controller`].
///
/// The loop only advances when [`ControlLoop::tick`] is called from the
/// fixed-step phase. Cancellation is a flag honoured at the top of the next
/// tick; a tick in progress always completes. Every prediction steps the
/// controller's own [`Controller::model`].
#[derive(Debug, Clone)]
pub struct ControlLoop<C> {
    controller: C,
    state: LoopState,
    cancel_requested: bool,
    ticks: u64,
}

impl<C: Controller> ControlLoop<C> {
    /// Fails unless the controller's model has six states.
    pub fn new(controller: C) -> Result<Self> {
        let states = controller.model().num_states();
        if states != StateVector::LEN {
            return Err(LanderError::dimension_mismatch(
                "controller model states",
                StateVector::LEN.to_string(),
                states.to_string(),
            ));
        }
        Ok(Self {
            controller,
            state: LoopState::Idle,
            cancel_requested: false,
            ticks: 0,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Ticks executed since the last activation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Start the loop. Returns false (and changes nothing) if already running.
    pub fn activate(&mut self) -> bool {
        if self.is_running() {
            debug!(controller = self.controller.name(), "already running");
            return false;
        }
        self.state = LoopState::Running;
        self.cancel_requested = false;
        self.ticks = 0;
        info!(controller = self.controller.name(), "controller activated");
        true
    }

    /// Back to Idle with a zeroed tick count, keeping the controller.
    pub fn reset(&mut self) {
        self.state = LoopState::Idle;
        self.cancel_requested = false;
        self.ticks = 0;
    }

    /// One Euler step of the controller's model from `current`.
    pub fn predict(&self, current: &StateVector, dt: f64) -> Result<StateVector> {
        predict(self.controller.model(), current, dt)
    }

    /// Ask a running loop to stop at its next tick.
    pub fn cancel(&mut self) {
        if self.is_running() {
            self.cancel_requested = true;
        }
    }

    /// Run one correction step against the body.
    pub fn tick(&mut self, body: &mut dyn RigidBody, props: &PhysicsProperties, dt: f64) -> LoopState {
        if self.state != LoopState::Running {
            return self.state;
        }
        if self.cancel_requested {
            self.cancel_requested = false;
            self.state = LoopState::Idle;
            info!(controller = self.controller.name(), ticks = self.ticks, "controller cancelled");
            return self.state;
        }

        let current = StateVector::from_body(body);
        let next = match self.predict(&current, dt) {
            Ok(next) => next,
            Err(err) => {
                warn!(controller = self.controller.name(), %err, "prediction failed, stopping");
                self.state = LoopState::Idle;
                return self.state;
            }
        };
        self.controller.correct(body, &next, props);
        self.ticks += 1;

        debug!(
            controller = self.controller.name(),
            tick = self.ticks,
            rotation = body.rotation(),
            angular_velocity = body.angular_velocity(),
            "correction applied"
        );

        if self.controller.converged(body, props) {
            self.controller.on_converged(body);
            self.state = LoopState::Converged;
            info!(
                controller = self.controller.name(),
                ticks = self.ticks,
                rotation = body.rotation(),
                "controller converged"
            );
        }
        self.state
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::body::Body2D;
    use crate::gnc::{LinearStateSpaceModel, LqrController, ObserverController};
    use approx::assert_relative_eq;

    /// Observer whose only dynamics are theta' = -10 theta: rotation decays
    /// by a factor of 0.8 per 0.02 s tick.
    fn decaying_observer() -> ObserverController {
        let mut a = [[0.0; 6]; 6];
        a[4][4] = -10.0;
        let mut c = [[0.0; 6]; 6];
        for (i, row) in c.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        let model = LinearStateSpaceModel::from_tables(&a, &[[0.0; 2]; 6], &c).unwrap();
        ObserverController::with_model(model)
    }

    fn tilted_body(rotation: f64) -> Body2D {
        let mut body = Body2D::new(1.0, 1.0);
        body.rotation = rotation;
        body
    }

    #[test]
    fn idle_loop_does_nothing() {
        let mut lp = ControlLoop::new(ObserverController::new().unwrap()).unwrap();
        let mut body = tilted_body(30.0);
        assert_eq!(lp.tick(&mut body, &PhysicsProperties::default(), 0.02), LoopState::Idle);
        assert_eq!(body.rotation, 30.0);
    }

    #[test]
    fn observer_converges_exactly_at_threshold() {
        let props = PhysicsProperties::default();
        let mut lp = ControlLoop::new(decaying_observer()).unwrap();
        let mut body = tilted_body(30.0);
        assert!(lp.activate());

        let mut rotations = Vec::new();
        while lp.is_running() {
            lp.tick(&mut body, &props, 0.02);
            rotations.push(body.rotation);
            assert!(rotations.len() < 100, "observer never converged");
        }

        assert_eq!(lp.state(), LoopState::Converged);
        let (last, before) = rotations.split_last().unwrap();
        assert!(last.abs() <= 5.0, "final rotation {last}");
        assert!(before.iter().all(|r| r.abs() > 5.0), "converged late: {rotations:?}");
        assert!(before.windows(2).all(|w| w[1] < w[0]), "sequence must decay");
        assert_eq!(rotations.len(), 9);

        // Never re-arms on its own.
        let frozen = body.clone();
        for _ in 0..10 {
            assert_eq!(lp.tick(&mut body, &props, 0.02), LoopState::Converged);
        }
        assert_eq!(body, frozen);
        assert_eq!(lp.ticks(), 9);
    }

    #[test]
    fn activation_while_running_is_a_no_op() {
        let mut lp = ControlLoop::new(decaying_observer()).unwrap();
        let mut body = tilted_body(30.0);
        assert!(lp.activate());
        lp.tick(&mut body, &PhysicsProperties::default(), 0.02);
        assert!(!lp.activate());
        assert_eq!(lp.ticks(), 1, "second activation must not restart the count");
    }

    #[test]
    fn cancel_takes_effect_on_next_tick() {
        let props = PhysicsProperties::default();
        let mut lp = ControlLoop::new(decaying_observer()).unwrap();
        let mut body = tilted_body(30.0);
        lp.activate();
        lp.tick(&mut body, &props, 0.02);
        let after_first = body.rotation;

        lp.cancel();
        assert!(lp.is_running(), "cancel is cooperative");
        assert_eq!(lp.tick(&mut body, &props, 0.02), LoopState::Idle);
        assert_eq!(body.rotation, after_first, "cancelled tick applies no correction");
    }

    #[test]
    fn converged_loop_can_be_restarted() {
        let props = PhysicsProperties::default();
        let mut lp = ControlLoop::new(decaying_observer()).unwrap();
        let mut body = tilted_body(4.0);
        lp.activate();
        assert_eq!(lp.tick(&mut body, &props, 0.02), LoopState::Converged);

        body.rotation = 40.0;
        assert!(lp.activate());
        assert_eq!(lp.tick(&mut body, &props, 0.02), LoopState::Running);
    }

    #[test]
    fn lqr_forces_zero_spin_on_convergence() {
        let props = PhysicsProperties::default();
        let mut lp = ControlLoop::new(LqrController::new().unwrap()).unwrap();
        let mut body = tilted_body(30.0);
        lp.activate();
        let mut n = 0;
        while lp.tick(&mut body, &props, 0.02) == LoopState::Running {
            n += 1;
            assert!(n < 10_000, "LQR loop never converged");
        }
        assert_eq!(body.angular_velocity, 0.0);
        assert!(body.rotation.abs() <= 5.0 || body.angular_velocity.abs() <= 0.2);
    }

    #[test]
    fn non_six_state_model_rejected() {
        let lqr = LqrController::with_model(LinearStateSpaceModel::new(3, 1));
        assert!(ControlLoop::new(lqr).is_err());
        let observer = ObserverController::with_model(LinearStateSpaceModel::new(5, 2));
        assert!(ControlLoop::new(observer).is_err());
    }

    #[test]
    fn tick_steps_the_controller_model() {
        let props = PhysicsProperties::default();
        let mut lp = ControlLoop::new(decaying_observer()).unwrap();
        let mut body = tilted_body(30.0);

        let expected = lp.predict(&StateVector::from_body(&body), 0.02).unwrap();
        lp.activate();
        lp.tick(&mut body, &props, 0.02);
        assert_relative_eq!(body.rotation, expected.theta_degrees(), epsilon = 1e-9);
        assert_relative_eq!(body.rotation, 24.0, epsilon = 1e-9);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut lp = ControlLoop::new(decaying_observer()).unwrap();
        let mut body = tilted_body(30.0);
        lp.activate();
        lp.tick(&mut body, &PhysicsProperties::default(), 0.02);
        lp.reset();
        assert_eq!(lp.state(), LoopState::Idle);
        assert_eq!(lp.ticks(), 0);
    }
}
