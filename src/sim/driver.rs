use nalgebra::Vector2;
use tracing::warn;

use crate::config::{Controls, EngineMounts, LanderConfig, PhysicsProperties};
use crate::dynamics::body::RigidBody;
use crate::error::Result;
use super::input::InputSource;

// ---------------------------------------------------------------------------
// Thruster visual effects (particle systems owned by the renderer)
// ---------------------------------------------------------------------------

pub trait ThrusterEffect {
    fn play(&mut self);
    fn stop(&mut self);
}

/// Effect handles for each engine. Any of them may be missing.
#[derive(Default)]
pub struct ThrusterEffects {
    pub main: Option<Box<dyn ThrusterEffect>>,
    pub left_stabilizer: Option<Box<dyn ThrusterEffect>>,
    pub right_stabilizer: Option<Box<dyn ThrusterEffect>>,
}

impl ThrusterEffects {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Engines that fired during a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveEngines {
    pub main: bool,
    pub left: bool,
    pub right: bool,
}

// ---------------------------------------------------------------------------
// Thrust directions
// ---------------------------------------------------------------------------

/// Main engine thrust direction: world up taken into the body frame, with x
/// mirrored. The result is the body's up axis expressed in world space.
pub fn main_thrust_direction(body: &dyn RigidBody) -> Vector2<f64> {
    let up = body.inverse_transform_direction(Vector2::y());
    Vector2::new(-up.x, up.y)
}

/// Stabilizer thrust direction for a world axis, with y mirrored. The result
/// is that axis carried along with the body's rotation.
pub fn stabilizer_thrust_direction(body: &dyn RigidBody, world_axis: Vector2<f64>) -> Vector2<f64> {
    let d = body.inverse_transform_direction(world_axis);
    Vector2::new(d.x, -d.y)
}

/// Scale `v` down to at most `max` length.
pub fn clamp_magnitude(v: Vector2<f64>, max: f64) -> Vector2<f64> {
    let norm = v.norm();
    if norm > max && norm > 0.0 {
        v * (max / norm)
    } else {
        v
    }
}

// ---------------------------------------------------------------------------
// Rigid-body physics driver
// ---------------------------------------------------------------------------

/// Turns key state into engine forces and enforces the physics limits.
pub struct RocketDriver {
    mounts: EngineMounts,
    main_multiplier: f64,
    stabilizer_multiplier: f64,
    controls: Controls,
    props: PhysicsProperties,
    effects: Option<[Box<dyn ThrusterEffect>; 3]>,
}

impl RocketDriver {
    /// Fails if any engine mount is undefined. Missing effect handles only
    /// disable the visuals.
    pub fn new(
        config: &LanderConfig,
        center_of_mass: Vector2<f64>,
        effects: ThrusterEffects,
    ) -> Result<Self> {
        let mut mounts = config.engines.mounts()?;
        // Keep the main engine in line with the center of mass.
        mounts.main.x += center_of_mass.x;

        let effects = match (effects.main, effects.left_stabilizer, effects.right_stabilizer) {
            (Some(mut main), Some(mut left), Some(mut right)) => {
                main.stop();
                left.stop();
                right.stop();
                Some([main, left, right])
            }
            _ => {
                warn!("at least one thruster particle system is not connected; thruster visuals disabled");
                None
            }
        };

        Ok(Self {
            mounts,
            main_multiplier: config.engines.main_thrust_multiplier,
            stabilizer_multiplier: config.engines.stabilizer_thrust_multiplier,
            controls: config.controls,
            props: config.physics.clone(),
            effects,
        })
    }

    pub fn mounts(&self) -> &EngineMounts {
        &self.mounts
    }

    pub fn effects_enabled(&self) -> bool {
        self.effects.is_some()
    }

    /// Apply one tick of thrust for every held engine key.
    pub fn apply_input(&self, body: &mut dyn RigidBody, input: &dyn InputSource, dt: f64) -> ActiveEngines {
        let mut active = ActiveEngines::default();

        if input.held(self.controls.main_thruster) {
            let force = main_thrust_direction(body) * self.main_multiplier * dt;
            let at = body.transform_point(self.mounts.main);
            body.apply_force_at_point(force, at);
            active.main = true;
        }

        if input.held(self.controls.left_thrust) {
            let force = stabilizer_thrust_direction(body, Vector2::x()) * self.stabilizer_multiplier * dt;
            let at = body.transform_point(self.mounts.left_stabilizer);
            body.apply_force_at_point(force, at);
            active.left = true;
        }

        if input.held(self.controls.right_thrust) {
            let force = stabilizer_thrust_direction(body, -Vector2::x()) * self.stabilizer_multiplier * dt;
            let at = body.transform_point(self.mounts.right_stabilizer);
            body.apply_force_at_point(force, at);
            active.right = true;
        }

        active
    }

    /// Clamp linear speed and angular velocity to the configured limits.
    pub fn clamp(&self, body: &mut dyn RigidBody) {
        body.set_velocity(clamp_magnitude(body.velocity(), self.props.max_speed));
        body.set_angular_velocity(
            body.angular_velocity()
                .clamp(-self.props.max_angular_speed, self.props.max_angular_speed),
        );
    }

    /// Vertical speed is slow enough to survive a collision.
    pub fn safe_to_land(&self, body: &dyn RigidBody) -> bool {
        body.velocity().y.abs() <= self.props.max_safe_landing_speed
    }

    /// Start effects on key-down and stop them on key-up. Render-rate.
    pub fn update_effects(&mut self, input: &dyn InputSource) {
        let keys = [
            self.controls.main_thruster,
            self.controls.left_thrust,
            self.controls.right_thrust,
        ];
        if let Some(effects) = self.effects.as_mut() {
            for (fx, key) in effects.iter_mut().zip(keys) {
                if input.pressed(key) {
                    fx.play();
                }
                if input.released(key) {
                    fx.stop();
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
