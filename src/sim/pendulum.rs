use approx::relative_eq;
use nalgebra::Vector3;

use super::timestep::{FixedTimestep, DEFAULT_DT};

// ---------------------------------------------------------------------------
// Rope pendulum on a fixed 100 Hz step with render interpolation
// ---------------------------------------------------------------------------

pub const PENDULUM_DT: f64 = DEFAULT_DT;

/// Fixed pivot and rope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rope {
    pub pivot: Vector3<f64>,
    pub mass: f64,
    pub gravity: Vector3<f64>,
    length: f64,
}

impl Rope {
    pub fn length(&self) -> f64 {
        self.length
    }
}

/// Integrated bob state.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bob {
    velocity: Vector3<f64>,
    current: Vector3<f64>,
    previous: Vector3<f64>,
    tension: f64,
}

impl Bob {
    fn at_rest(position: Vector3<f64>) -> Self {
        Self { velocity: Vector3::zeros(), current: position, previous: position, tension: 0.0 }
    }

    /// One fixed step; shifts `current` into `previous`.
    fn step(&mut self, rope: &Rope, dt: f64) -> Vector3<f64> {
        let g = rope.gravity.norm();
        let gravity_dir = normalize_or_zero(rope.gravity);
        self.velocity += gravity_dir * (rope.mass * g) * dt;

        let pivot = rope.pivot;
        let bob = self.current;

        let reach = (bob + self.velocity * dt - pivot).norm();
        if reach > rope.length || relative_eq!(reach, rope.length, max_relative = 1e-6) {
            let tension_dir = normalize_or_zero(pivot - bob);
            let inclination = angle_between(bob - pivot, gravity_dir);
            let centripetal = if rope.length > 0.0 {
                rope.mass * self.velocity.norm_squared() / rope.length
            } else {
                0.0
            };
            self.tension = rope.mass * g * inclination.cos() + centripetal;
            self.velocity += tension_dir * self.tension * dt;
        }

        let target = bob + self.velocity * dt;
        let distance = (target - pivot).norm();
        self.previous = self.current;
        self.current = point_on_line(pivot, target, distance.min(rope.length));
        self.current
    }

    fn blend(&self, alpha: f64) -> Vector3<f64> {
        self.current * alpha + self.previous * (1.0 - alpha)
    }
}

/// Bob hanging from a fixed pivot on an inextensible rope.
///
/// The rope length is taken from the bob's distance at construction. Motion
/// is free fall until the bob reaches the end of the rope, where tension
/// (gravity component plus centripetal term) pulls it back toward the pivot.
#[derive(Debug, Clone)]
pub struct Pendulum {
    pub rope: Rope,
    bob: Bob,
    start_position: Vector3<f64>,
    drawn: Vector3<f64>,
    clock: FixedTimestep,
}

impl Pendulum {
    pub fn new(pivot: Vector3<f64>, bob: Vector3<f64>, mass: f64) -> Self {
        Self {
            rope: Rope {
                pivot,
                mass,
                gravity: Vector3::new(0.0, -9.81, 0.0),
                length: (bob - pivot).norm(),
            },
            bob: Bob::at_rest(bob),
            start_position: bob,
            drawn: bob,
            clock: FixedTimestep::default(),
        }
    }

    pub fn rope_length(&self) -> f64 {
        self.rope.length
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.bob.velocity
    }

    /// Latest simulated bob position (not interpolated).
    pub fn position(&self) -> Vector3<f64> {
        self.bob.current
    }

    /// Position returned by the last `advance`.
    pub fn drawn(&self) -> Vector3<f64> {
        self.drawn
    }

    /// Rope tension from the last step that reached the rope's end, N.
    pub fn tension(&self) -> f64 {
        self.bob.tension
    }

    pub fn steps(&self) -> u64 {
        self.clock.steps()
    }

    /// Feed one render frame; returns the interpolated bob position to draw.
    pub fn advance(&mut self, frame_time: f64) -> Vector3<f64> {
        let Self { rope, bob, clock, .. } = self;
        let alpha = clock.advance(frame_time, |dt| {
            bob.step(rope, dt);
        });
        self.drawn = self.bob.blend(alpha);
        self.drawn
    }

    /// Put the bob back where it started. Built-up velocity is kept.
    pub fn reset_position(&mut self) {
        self.bob.current = self.start_position;
        self.bob.previous = self.start_position;
        self.drawn = self.start_position;
    }

    /// Clear built-up velocity and continue from the drawn position.
    pub fn reset_forces(&mut self) {
        self.bob.velocity = Vector3::zeros();
        self.bob.current = self.drawn;
        self.bob.previous = self.drawn;
    }

    /// One fixed step outside the render clock. Returns the new position.
    pub fn step(&mut self, dt: f64) -> Vector3<f64> {
        self.bob.step(&self.rope, dt)
    }
}

fn normalize_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
}

fn angle_between(a: Vector3<f64>, b: Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < 1e-15 {
        return 0.0;
    }
    (a.dot(&b) / denom).clamp(-1.0, 1.0).acos()
}

fn point_on_line(start: Vector3<f64>, end: Vector3<f64>, distance: f64) -> Vector3<f64> {
    start + normalize_or_zero(end - start) * distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn swinging() -> Pendulum {
        // 2 m rope, released horizontally.
        Pendulum::new(Vector3::zeros(), Vector3::new(2.0, 0.0, 0.0), 1.0)
    }

    #[test]
    fn rope_length_from_initial_distance() {
        let p = Pendulum::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, 2.0, 4.0), 1.0);
        assert_relative_eq!(p.rope_length(), 5.0);
    }

    #[test]
    fn bob_never_leaves_rope() {
        let mut p = swinging();
        for _ in 0..2_000 {
            let pos = p.step(PENDULUM_DT);
            assert!(pos.norm() <= p.rope_length() + 1e-9, "bob at {}", pos.norm());
        }
    }

    #[test]
    fn bob_swings_down_and_across() {
        let mut p = swinging();
        let mut lowest: f64 = 0.0;
        let mut min_x = f64::INFINITY;
        for _ in 0..300 {
            let pos = p.step(PENDULUM_DT);
            lowest = lowest.min(pos.y);
            min_x = min_x.min(pos.x);
        }
        assert!(lowest < -1.9, "should swing through the bottom, lowest {lowest}");
        assert!(min_x < 0.0, "should cross to the other side, min x {min_x}");
    }

    #[test]
    fn slack_rope_is_free_fall() {
        // Bob starts well inside the rope: first step is pure gravity.
        let mut p = Pendulum::new(Vector3::zeros(), Vector3::new(0.0, -1.0, 0.0), 1.0);
        p.rope.length = 3.0;
        let pos = p.step(PENDULUM_DT);
        assert_relative_eq!(p.velocity().y, -9.81 * PENDULUM_DT, epsilon = 1e-12);
        assert_relative_eq!(pos.y, -1.0 - 9.81 * PENDULUM_DT * PENDULUM_DT, epsilon = 1e-12);
        assert_eq!(p.tension(), 0.0);
    }

    #[test]
    fn advance_interpolates_between_steps() {
        let mut p = swinging();
        let drawn = p.advance(0.025);
        assert_eq!(p.steps(), 2);
        // Halfway between step 2 (current) and step 1 (previous).
        let expected = p.bob.current * 0.5 + p.bob.previous * 0.5;
        assert_relative_eq!(drawn, expected, epsilon = 1e-9);
    }

    #[test]
    fn reset_position_keeps_velocity() {
        let mut p = swinging();
        p.advance(0.5);
        let v = p.velocity();
        assert!(v.norm() > 0.0);
        p.reset_position();
        assert_eq!(p.position(), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(p.drawn(), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(p.velocity(), v);
    }

    #[test]
    fn reset_forces_continues_from_drawn_position() {
        let mut p = swinging();
        // 50 steps plus half a step, so the drawn point sits between states
        let drawn = p.advance(0.505);
        assert_ne!(drawn, p.position());
        p.reset_forces();
        assert_eq!(p.velocity(), Vector3::zeros());
        assert_eq!(p.position(), drawn);
        assert_relative_eq!(p.advance(0.0), drawn, epsilon = 1e-12);
    }

    #[test]
    fn runs_on_the_default_clock() {
        let mut p = swinging();
        p.advance(1.0);
        assert_eq!(p.steps(), 100);
        assert_eq!(PENDULUM_DT, 0.01);
    }

    #[test]
    fn bob_at_pivot_does_not_produce_nan() {
        let mut p = Pendulum::new(Vector3::zeros(), Vector3::zeros(), 1.0);
        let pos = p.step(PENDULUM_DT);
        assert!(pos.iter().all(|v| v.is_finite()));
    }
}
