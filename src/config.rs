use std::path::Path;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{LanderError, Result};
use crate::sim::input::Key;

// ---------------------------------------------------------------------------
// Physics limits
// ---------------------------------------------------------------------------

/// Hard limits on the rocket's motion and the controller dead zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsProperties {
    pub max_speed: f64,                  // m/s
    pub max_angular_speed: f64,          // deg/s
    pub control_threshold: f64,          // deg of dead space in the controller
    pub velocity_control_threshold: f64, // deg/s
    pub max_safe_landing_speed: f64,     // m/s, vertical
}

impl Default for PhysicsProperties {
    fn default() -> Self {
        Self {
            max_speed: 30.0,
            max_angular_speed: 15.0,
            control_threshold: 5.0,
            velocity_control_threshold: 0.2,
            max_safe_landing_speed: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Engines
// ---------------------------------------------------------------------------

/// Engine mount points (body-local, metres) and thrust multipliers.
///
/// Mounts are optional here so that a configuration which leaves one out can
/// be rejected when the simulation is assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Engines {
    pub main: Option<[f64; 2]>,
    pub main_thrust_multiplier: f64,
    pub left_stabilizer: Option<[f64; 2]>,
    pub right_stabilizer: Option<[f64; 2]>,
    pub stabilizer_thrust_multiplier: f64,
}

impl Default for Engines {
    fn default() -> Self {
        Self {
            main: Some([0.0, -1.0]),
            main_thrust_multiplier: 100.0,
            left_stabilizer: Some([-0.5, 0.75]),
            right_stabilizer: Some([0.5, 0.75]),
            stabilizer_thrust_multiplier: 2.0,
        }
    }
}

/// Resolved engine mount points, all present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineMounts {
    pub main: Vector2<f64>,
    pub left_stabilizer: Vector2<f64>,
    pub right_stabilizer: Vector2<f64>,
}

impl Engines {
    /// Resolve every mount point, failing on the first undefined engine.
    pub fn mounts(&self) -> Result<EngineMounts> {
        let get = |mount: Option<[f64; 2]>, name: &'static str| {
            mount
                .map(|[x, y]| Vector2::new(x, y))
                .ok_or(LanderError::MissingEngine(name))
        };
        Ok(EngineMounts {
            main: get(self.main, "main")?,
            left_stabilizer: get(self.left_stabilizer, "left_stabilizer")?,
            right_stabilizer: get(self.right_stabilizer, "right_stabilizer")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// Key bindings for each engine and the reset action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    pub main_thruster: Key,
    pub left_thrust: Key,
    pub right_thrust: Key,
    pub reset: Key,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            main_thruster: Key::Space,
            left_thrust: Key::Q,
            right_thrust: Key::E,
            reset: Key::R,
        }
    }
}

// ---------------------------------------------------------------------------
// World and body
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub fixed_dt: f64,          // physics timestep, s
    pub gravity: [f64; 2],      // m/s^2
    pub lower_world_bound: f64, // m, below this the run resets
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 0.02, // 50 Hz
            gravity: [0.0, -9.81],
            lower_world_bound: -6.0,
        }
    }
}

impl WorldConfig {
    pub fn gravity(&self) -> Vector2<f64> {
        Vector2::new(self.gravity[0], self.gravity[1])
    }
}

/// Mass properties of the reference rigid body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub mass: f64,                // kg
    pub inertia: f64,             // kg·m^2
    pub center_of_mass: [f64; 2], // body-local, m
    pub gravity_scale: f64,
    pub linear_drag: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inertia: 0.5,
            center_of_mass: [0.0, 0.0],
            gravity_scale: 1.0,
            linear_drag: 0.0,
        }
    }
}

/// Ranges the rocket spawns in at the start of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnCharacteristics {
    pub height_range: [f64; 2],
    pub x_range: [f64; 2],
}

impl Default for SpawnCharacteristics {
    fn default() -> Self {
        Self {
            height_range: [300.0, 1000.0],
            x_range: [-300.0, 300.0],
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate configuration
// ---------------------------------------------------------------------------

/// Everything a run needs, set once at initialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanderConfig {
    pub physics: PhysicsProperties,
    pub engines: Engines,
    pub controls: Controls,
    pub world: WorldConfig,
    pub body: BodyConfig,
    pub spawn: SpawnCharacteristics,
}

impl LanderConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values no run can start with.
    pub fn validate(&self) -> Result<()> {
        let w = &self.world;
        if !(w.fixed_dt.is_finite() && w.fixed_dt > 0.0) {
            return Err(LanderError::invalid_config(format!(
                "world.fixed_dt must be positive, got {}",
                w.fixed_dt
            )));
        }

        let p = &self.physics;
        positive("physics.max_speed", p.max_speed)?;
        positive("physics.max_angular_speed", p.max_angular_speed)?;
        non_negative("physics.control_threshold", p.control_threshold)?;
        non_negative(
            "physics.velocity_control_threshold",
            p.velocity_control_threshold,
        )?;
        non_negative("physics.max_safe_landing_speed", p.max_safe_landing_speed)?;

        positive("body.mass", self.body.mass)?;
        positive("body.inertia", self.body.inertia)?;
        non_negative("body.linear_drag", self.body.linear_drag)?;

        for (name, [lo, hi]) in [
            ("spawn.height_range", self.spawn.height_range),
            ("spawn.x_range", self.spawn.x_range),
        ] {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return Err(LanderError::invalid_config(format!(
                    "{name} must be an ordered [min, max] pair, got [{lo}, {hi}]"
                )));
            }
        }

        Ok(())
    }
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(LanderError::invalid_config(format!(
            "{name} must be positive, got {v}"
        )))
    }
}

fn non_negative(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(LanderError::invalid_config(format!(
            "{name} must be non-negative, got {v}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        LanderConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = LanderConfig::from_json_str(r#"{ "physics": { "max_speed": 12.5 } }"#).unwrap();
        assert_eq!(cfg.physics.max_speed, 12.5);
        assert_eq!(cfg.physics.control_threshold, 5.0);
        assert_eq!(cfg.controls.main_thruster, Key::Space);
        assert_eq!(cfg.world.fixed_dt, 0.02);
    }

    #[test]
    fn null_engine_is_reported_by_name() {
        let cfg = LanderConfig::from_json_str(r#"{ "engines": { "right_stabilizer": null } }"#)
            .unwrap();
        match cfg.engines.mounts() {
            Err(LanderError::MissingEngine(name)) => assert_eq!(name, "right_stabilizer"),
            other => panic!("expected MissingEngine, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_timestep_rejected() {
        let err = LanderConfig::from_json_str(r#"{ "world": { "fixed_dt": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, LanderError::InvalidConfig(_)));
    }

    #[test]
    fn inverted_spawn_range_rejected() {
        let mut cfg = LanderConfig::default();
        cfg.spawn.height_range = [10.0, 5.0];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = LanderConfig::from_json_str("{ physics: ").unwrap_err();
        assert!(matches!(err, LanderError::Parse(_)));
    }

    #[test]
    fn key_bindings_deserialize() {
        let cfg = LanderConfig::from_json_str(r#"{ "controls": { "main_thruster": "W" } }"#)
            .unwrap();
        assert_eq!(cfg.controls.main_thruster, Key::W);
        assert_eq!(cfg.controls.reset, Key::R);
    }
}
