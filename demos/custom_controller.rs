use rocket_lander::config::PhysicsProperties;
use rocket_lander::dynamics::{Body2D, RigidBody, StateVector};
use rocket_lander::gnc::{ControlLoop, Controller, LinearStateSpaceModel, LoopState};

/// Pure exponential decay of rotation and spin, stopped once both are
/// inside their dead zones.
struct DecayController {
    model: LinearStateSpaceModel,
}

impl DecayController {
    fn new(rate: f64) -> rocket_lander::Result<Self> {
        let mut a = [[0.0; 6]; 6];
        a[4][4] = -rate;
        a[5][5] = -rate;
        let mut c = [[0.0; 6]; 6];
        for (i, row) in c.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        let model = LinearStateSpaceModel::from_tables(&a, &[[0.0; 2]; 6], &c)?;
        Ok(Self { model })
    }
}

impl Controller for DecayController {
    fn model(&self) -> &LinearStateSpaceModel {
        &self.model
    }

    fn correct(&mut self, body: &mut dyn RigidBody, next: &StateVector, _props: &PhysicsProperties) {
        body.set_rotation(next.theta_degrees());
        body.set_angular_velocity(next.omega());
    }

    fn converged(&self, body: &dyn RigidBody, props: &PhysicsProperties) -> bool {
        body.rotation().abs() <= props.control_threshold
            && body.angular_velocity().abs() <= props.velocity_control_threshold
    }

    fn name(&self) -> &str {
        "Decay"
    }
}

fn main() -> rocket_lander::Result<()> {
    let props = PhysicsProperties::default();
    let mut body = Body2D::new(1.0, 0.5);
    body.rotation = 45.0;
    body.angular_velocity = 12.0;

    let mut lp = ControlLoop::new(DecayController::new(4.0)?)?;
    println!("Correcting with {} controller...", lp.controller().name());
    lp.activate();

    while lp.tick(&mut body, &props, 0.02) == LoopState::Running {
        body.step(0.02);
    }

    println!("Ticks: {}", lp.ticks());
    println!("Rotation: {:.2} deg", body.rotation);
    println!("Angular velocity: {:.3} deg/s", body.angular_velocity);
    Ok(())
}
