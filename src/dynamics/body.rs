use nalgebra::{Rotation2, Vector2};

use crate::config::BodyConfig;

// ---------------------------------------------------------------------------
// Rigid body interface (owned by the physics engine)
// ---------------------------------------------------------------------------

/// Read/write view of a 2D rigid body.
///
/// Rotation is in degrees (unwrapped, counter-clockwise positive) and angular
/// velocity in degrees per second.
pub trait RigidBody {
    fn position(&self) -> Vector2<f64>;
    fn velocity(&self) -> Vector2<f64>;
    fn set_velocity(&mut self, v: Vector2<f64>);
    fn rotation(&self) -> f64;
    fn set_rotation(&mut self, degrees: f64);
    fn angular_velocity(&self) -> f64;
    fn set_angular_velocity(&mut self, deg_per_s: f64);
    fn mass(&self) -> f64;
    fn inertia(&self) -> f64;
    /// Center of mass in body-local coordinates.
    fn center_of_mass(&self) -> Vector2<f64>;

    /// Apply a world-space force at a world-space point for the current step.
    fn apply_force_at_point(&mut self, force: Vector2<f64>, point: Vector2<f64>);

    /// Advance the engine's own integrator by one fixed step.
    fn step(&mut self, dt: f64);

    /// Body-local point to world space.
    fn transform_point(&self, local: Vector2<f64>) -> Vector2<f64> {
        self.position() + Rotation2::new(self.rotation().to_radians()) * local
    }

    /// World-space direction to body-local coordinates.
    fn inverse_transform_direction(&self, world: Vector2<f64>) -> Vector2<f64> {
        Rotation2::new(-self.rotation().to_radians()) * world
    }
}

// ---------------------------------------------------------------------------
// Reference in-process body: semi-implicit Euler, point gravity
// ---------------------------------------------------------------------------

/// Minimal rigid body used when no engine is attached (tests, headless runs).
///
/// Forces accumulate between steps and are cleared by [`RigidBody::step`].
/// The body rotates about its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Body2D {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub rotation: f64,         // deg
    pub angular_velocity: f64, // deg/s
    pub mass: f64,
    pub inertia: f64,
    pub center_of_mass: Vector2<f64>,
    pub gravity: Vector2<f64>,
    pub gravity_scale: f64,
    pub linear_drag: f64,
    force: Vector2<f64>,
    torque: f64,
}

impl Body2D {
    /// A body at rest at the origin with no gravity.
    pub fn new(mass: f64, inertia: f64) -> Self {
        Self {
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            rotation: 0.0,
            angular_velocity: 0.0,
            mass,
            inertia,
            center_of_mass: Vector2::zeros(),
            gravity: Vector2::zeros(),
            gravity_scale: 1.0,
            linear_drag: 0.0,
            force: Vector2::zeros(),
            torque: 0.0,
        }
    }

    pub fn from_config(cfg: &BodyConfig, gravity: Vector2<f64>) -> Self {
        Self {
            center_of_mass: Vector2::new(cfg.center_of_mass[0], cfg.center_of_mass[1]),
            gravity,
            gravity_scale: cfg.gravity_scale,
            linear_drag: cfg.linear_drag,
            ..Self::new(cfg.mass, cfg.inertia)
        }
    }

    pub fn set_position(&mut self, p: Vector2<f64>) {
        self.position = p;
    }

    /// Force accumulated since the last step.
    pub fn pending_force(&self) -> Vector2<f64> {
        self.force
    }

    /// Torque accumulated since the last step, N·m.
    pub fn pending_torque(&self) -> f64 {
        self.torque
    }
}

impl RigidBody for Body2D {
    fn position(&self) -> Vector2<f64> { self.position }
    fn velocity(&self) -> Vector2<f64> { self.velocity }
    fn set_velocity(&mut self, v: Vector2<f64>) { self.velocity = v; }
    fn rotation(&self) -> f64 { self.rotation }
    fn set_rotation(&mut self, degrees: f64) { self.rotation = degrees; }
    fn angular_velocity(&self) -> f64 { self.angular_velocity }
    fn set_angular_velocity(&mut self, deg_per_s: f64) { self.angular_velocity = deg_per_s; }
    fn mass(&self) -> f64 { self.mass }
    fn inertia(&self) -> f64 { self.inertia }
    fn center_of_mass(&self) -> Vector2<f64> { self.center_of_mass }

    fn apply_force_at_point(&mut self, force: Vector2<f64>, point: Vector2<f64>) {
        let arm = point - self.transform_point(self.center_of_mass);
        self.force += force;
        self.torque += arm.x * force.y - arm.y * force.x;
    }

    fn step(&mut self, dt: f64) {
        let accel = self.force / self.mass + self.gravity * self.gravity_scale;
        self.velocity += accel * dt;
        self.velocity *= 1.0 / (1.0 + dt * self.linear_drag);
        self.angular_velocity += (self.torque / self.inertia).to_degrees() * dt;

        self.position += self.velocity * dt;
        self.rotation += self.angular_velocity * dt;

        self.force = Vector2::zeros();
        self.torque = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
