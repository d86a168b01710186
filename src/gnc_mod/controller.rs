use crate::config::PhysicsProperties;
use crate::dynamics::body::RigidBody;
use crate::dynamics::state::StateVector;
use crate::error::Result;
use super::model::{self, LinearStateSpaceModel};

/// A correction law driven by one linear model.
///
/// Implement this to plug a different prediction model or stopping rule into
/// a [`ControlLoop`](super::ControlLoop).
pub trait Controller {
    /// Model the loop predicts with. Must have six states.
    fn model(&self) -> &LinearStateSpaceModel;

    /// Write the predicted state back onto the body.
    fn correct(&mut self, body: &mut dyn RigidBody, next: &StateVector, props: &PhysicsProperties);

    /// Stopping rule, evaluated after the correction is applied.
    fn converged(&self, body: &dyn RigidBody, props: &PhysicsProperties) -> bool;

    /// Runs once on the converging tick.
    fn on_converged(&mut self, _body: &mut dyn RigidBody) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

// ---------------------------------------------------------------------------
// Observer: autonomous model, clamped angular velocity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ObserverController {
    model: LinearStateSpaceModel,
}

impl ObserverController {
    pub fn new() -> Result<Self> {
        Ok(Self::with_model(model::autonomous()?))
    }

    /// Six-state models only; [`ControlLoop::new`](super::ControlLoop::new)
    /// rejects anything else.
    pub fn with_model(model: LinearStateSpaceModel) -> Self {
        Self { model }
    }
}

impl Controller for ObserverController {
    fn model(&self) -> &LinearStateSpaceModel {
        &self.model
    }

    fn correct(&mut self, body: &mut dyn RigidBody, next: &StateVector, props: &PhysicsProperties) {
        body.set_rotation(next.theta_degrees());
        // Clamped to avoid jerky corrective motion.
        body.set_angular_velocity(
            next.omega()
                .clamp(-props.max_angular_speed, props.max_angular_speed),
        );
    }

    fn converged(&self, body: &dyn RigidBody, props: &PhysicsProperties) -> bool {
        body.rotation().abs() <= props.control_threshold
    }

    fn name(&self) -> &str {
        "observer"
    }
}

// ---------------------------------------------------------------------------
// LQR: closed-loop model, unclamped angular velocity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LqrController {
    model: LinearStateSpaceModel,
}

impl LqrController {
    pub fn new() -> Result<Self> {
        Ok(Self::with_model(model::lqr()?))
    }

    /// Six-state models only; [`ControlLoop::new`](super::ControlLoop::new)
    /// rejects anything else.
    pub fn with_model(model: LinearStateSpaceModel) -> Self {
        Self { model }
    }
}

impl Controller for LqrController {
    fn model(&self) -> &LinearStateSpaceModel {
        &self.model
    }

    fn correct(&mut self, body: &mut dyn RigidBody, next: &StateVector, _props: &PhysicsProperties) {
        body.set_rotation(next.theta_degrees());
        body.set_angular_velocity(next.omega());
    }

    // Either threshold stops the loop, unlike the observer which only
    // watches rotation.
    fn converged(&self, body: &dyn RigidBody, props: &PhysicsProperties) -> bool {
        body.rotation().abs() <= props.control_threshold
            || body.angular_velocity().abs() <= props.velocity_control_threshold
    }

    fn on_converged(&mut self, body: &mut dyn RigidBody) {
        body.set_angular_velocity(0.0);
    }

    fn name(&self) -> &str {
        "lqr"
    }
}
