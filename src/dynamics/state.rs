use nalgebra::{DVector, Vector6};

use super::body::RigidBody;

// ---------------------------------------------------------------------------
// Angle helpers
// ---------------------------------------------------------------------------

/// Wrap an angle in degrees into (-180, 180].
pub fn wrap_degrees(rotation: f64) -> f64 {
    let r = rotation % 360.0;
    if r <= -180.0 {
        r + 360.0
    } else if r > 180.0 {
        r - 360.0
    } else {
        r
    }
}

// ---------------------------------------------------------------------------
// 6-state kinematic snapshot: [x, vx, y, vy, theta, omega]
// ---------------------------------------------------------------------------

/// Kinematic snapshot of the rocket, in the order the state-space models use.
///
/// `theta` is in radians, wrapped from (-180°, 180°]. `omega` is passed
/// through exactly as the body reports it (deg/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector(pub Vector6<f64>);

impl StateVector {
    pub const X: usize = 0;
    pub const VX: usize = 1;
    pub const Y: usize = 2;
    pub const VY: usize = 3;
    pub const THETA: usize = 4;
    pub const OMEGA: usize = 5;

    pub const LEN: usize = 6;

    pub fn new(x: f64, vx: f64, y: f64, vy: f64, theta: f64, omega: f64) -> Self {
        Self(Vector6::new(x, vx, y, vy, theta, omega))
    }

    /// Read the current state off a rigid body. No side effects.
    pub fn from_body(body: &dyn RigidBody) -> Self {
        let pos = body.position();
        let vel = body.velocity();
        Self::new(
            pos.x,
            vel.x,
            pos.y,
            vel.y,
            wrap_degrees(body.rotation()).to_radians(),
            body.angular_velocity(),
        )
    }

    pub fn x(&self) -> f64 { self.0[Self::X] }
    pub fn vx(&self) -> f64 { self.0[Self::VX] }
    pub fn y(&self) -> f64 { self.0[Self::Y] }
    pub fn vy(&self) -> f64 { self.0[Self::VY] }
    pub fn theta(&self) -> f64 { self.0[Self::THETA] }
    pub fn omega(&self) -> f64 { self.0[Self::OMEGA] }

    /// Rotation in degrees.
    pub fn theta_degrees(&self) -> f64 {
        self.theta().to_degrees()
    }

    pub fn to_dvector(&self) -> DVector<f64> {
        DVector::from_column_slice(self.0.as_slice())
    }

    /// Build from a dynamic vector; `None` unless it has exactly six entries.
    pub fn from_dvector(v: &DVector<f64>) -> Option<Self> {
        (v.len() == Self::LEN).then(|| Self(Vector6::from_column_slice(v.as_slice())))
    }
}

impl std::fmt::Display for StateVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[x={:.4}, vx={:.4}, y={:.4}, vy={:.4}, theta={:.4} rad, omega={:.4}]",
            self.x(),
            self.vx(),
            self.y(),
            self.vy(),
            self.theta(),
            self.omega()
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
