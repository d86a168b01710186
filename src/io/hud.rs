use std::fmt;

use crate::dynamics::body::RigidBody;
use crate::dynamics::state::wrap_degrees;

/// Values shown on the flight HUD, already rounded to whole units.
///
/// Rounding is half-to-even. Negative zero is shown as `0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudReadout {
    pub height: f64,   // m
    pub velocity: f64, // m/s, vertical
    pub angle: f64,    // deg, wrapped into (-180, 180]
}

fn round_display(v: f64) -> f64 {
    // + 0.0 turns -0.0 into 0.0
    v.round_ties_even() + 0.0
}

impl HudReadout {
    pub fn from_body(body: &dyn RigidBody) -> Self {
        Self {
            height: round_display(body.position().y),
            velocity: round_display(body.velocity().y),
            angle: round_display(wrap_degrees(body.rotation())),
        }
    }

    pub fn height_text(&self) -> String {
        format!("Height: {}m", self.height)
    }

    pub fn velocity_text(&self) -> String {
        format!("Velocity: {}m/s", self.velocity)
    }

    pub fn angle_text(&self) -> String {
        format!("Angle: {} degrees", self.angle)
    }
}

impl fmt::Display for HudReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.height_text(),
            self.velocity_text(),
            self.angle_text()
        )
    }
}
