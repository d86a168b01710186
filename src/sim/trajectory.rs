use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Ballistic trajectory preview (gravity + linear drag, no thrust)
// ---------------------------------------------------------------------------

/// Engine default for solver velocity iterations per physics step.
pub const DEFAULT_VELOCITY_ITERATIONS: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPlotter {
    pub steps: usize,
    pub step_interval: f64,
    pub fixed_dt: f64,
    pub velocity_iterations: u32,
    pub gravity: Vector2<f64>,
    pub gravity_scale: f64,
    pub linear_drag: f64,
}

impl Default for TrajectoryPlotter {
    fn default() -> Self {
        Self {
            steps: 50,
            step_interval: 1.0,
            fixed_dt: 0.02,
            velocity_iterations: DEFAULT_VELOCITY_ITERATIONS,
            gravity: Vector2::new(0.0, -9.81),
            gravity_scale: 1.0,
            linear_drag: 0.0,
        }
    }
}

impl TrajectoryPlotter {
    /// Sub-step length used by the preview.
    pub fn timestep(&self) -> f64 {
        self.step_interval * self.fixed_dt / f64::from(self.velocity_iterations.max(1))
    }

    /// Predicted positions, one per preview step, starting after `pos`.
    pub fn plot(&self, mut pos: Vector2<f64>, velocity: Vector2<f64>) -> Vec<Vector2<f64>> {
        let ts = self.timestep();
        let gravity_step = self.gravity * self.gravity_scale * ts * ts;
        let drag = 1.0 - ts * self.linear_drag;
        let mut move_step = velocity * ts;

        (0..self.steps)
            .map(|_| {
                move_step += gravity_step;
                move_step *= drag;
                pos += move_step;
                pos
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn no_gravity_no_drag_is_a_straight_line() {
        let plotter = TrajectoryPlotter {
            gravity: Vector2::zeros(),
            ..Default::default()
        };
        let pts = plotter.plot(Vector2::zeros(), Vector2::new(4.0, 0.0));
        assert_eq!(pts.len(), 50);
        let ts = plotter.timestep();
        for (i, p) in pts.iter().enumerate() {
            assert_relative_eq!(p.x, 4.0 * ts * (i + 1) as f64, epsilon = 1e-12);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn timestep_splits_fixed_step_by_iterations() {
        let plotter = TrajectoryPlotter::default();
        assert_relative_eq!(plotter.timestep(), 0.0025);
    }

    #[test]
    fn gravity_bends_the_arc_down() {
        let plotter = TrajectoryPlotter::default();
        let pts = plotter.plot(Vector2::new(0.0, 10.0), Vector2::new(5.0, 5.0));
        let peak = pts.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert!(peak > 10.0);
        // Downward curvature: second differences are negative.
        for w in pts.windows(3) {
            assert!(w[2].y - 2.0 * w[1].y + w[0].y < 0.0);
        }
    }

    #[test]
    fn drag_shortens_the_arc() {
        let free = TrajectoryPlotter::default();
        let draggy = TrajectoryPlotter { linear_drag: 5.0, ..Default::default() };
        let v = Vector2::new(10.0, 0.0);
        let a = free.plot(Vector2::zeros(), v);
        let b = draggy.plot(Vector2::zeros(), v);
        assert!(b.last().unwrap().x < a.last().unwrap().x);
    }
}
