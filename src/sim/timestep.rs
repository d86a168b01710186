// ---------------------------------------------------------------------------
// Fixed timestep decoupled from the render clock ("fix your timestep")
// ---------------------------------------------------------------------------

use crate::error::{LanderError, Result};

/// 100 Hz.
pub const DEFAULT_DT: f64 = 0.01;

/// Accumulates render-frame time and releases it in whole fixed steps.
///
/// Steps are counted against total elapsed time rather than a running
/// remainder, so after elapsed time `T` exactly `floor(T / dt)` steps have
/// run no matter how the frames were sliced.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedTimestep {
    dt: f64,
    elapsed: f64,
    steps: u64,
}

impl FixedTimestep {
    /// `dt` must be positive and finite.
    pub fn new(dt: f64) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(LanderError::invalid_config(format!(
                "fixed timestep must be positive and finite, got {dt}"
            )));
        }
        Ok(Self { dt, elapsed: 0.0, steps: 0 })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Fixed steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated time, `steps * dt`.
    pub fn time(&self) -> f64 {
        self.steps as f64 * self.dt
    }

    /// Render-clock time fed in so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Leftover time not yet simulated.
    pub fn accumulator(&self) -> f64 {
        (self.elapsed - self.time()).max(0.0)
    }

    /// Blend factor between the previous and current simulated states.
    pub fn alpha(&self) -> f64 {
        (self.accumulator() / self.dt).clamp(0.0, 1.0)
    }

    /// Feed one frame's delta; calls `step(dt)` for each fixed step now due.
    /// Returns the interpolation alpha.
    pub fn advance<F: FnMut(f64)>(&mut self, frame_time: f64, step: F) -> f64 {
        let total = self.elapsed + frame_time.max(0.0);
        self.advance_to(total, step)
    }

    /// Feed an absolute clock reading (seconds since start).
    pub fn advance_to<F: FnMut(f64)>(&mut self, now: f64, mut step: F) -> f64 {
        if now > self.elapsed {
            self.elapsed = now;
        }
        let due = (self.elapsed / self.dt).floor() as u64;
        while self.steps < due {
            step(self.dt);
            self.steps += 1;
        }
        self.alpha()
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.steps = 0;
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self { dt: DEFAULT_DT, elapsed: 0.0, steps: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_at_frame_rate(hz: f64, t_end: f64, dt: f64) -> u64 {
        let mut ts = FixedTimestep::new(dt).unwrap();
        let mut calls = 0u64;
        let frames = (t_end * hz).ceil() as u64;
        for k in 1..=frames {
            let now = (k as f64 / hz).min(t_end);
            ts.advance_to(now, |_| calls += 1);
        }
        assert_eq!(calls, ts.steps());
        calls
    }

    #[test]
    fn step_count_matches_floor_for_any_frame_rate() {
        let dt: f64 = 0.01;
        for t_end in [0.5, 1.0, 2.37, 10.0] {
            let expected = (t_end / dt).floor() as u64;
            for hz in [30.0, 59.94, 60.0, 144.0, 1000.0] {
                assert_eq!(
                    run_at_frame_rate(hz, t_end, dt),
                    expected,
                    "hz={hz} t_end={t_end}"
                );
            }
        }
    }

    #[test]
    fn no_step_before_dt_elapses() {
        let mut ts = FixedTimestep::new(0.01).unwrap();
        let mut calls = 0;
        let alpha = ts.advance(0.004, |_| calls += 1);
        assert_eq!(calls, 0);
        assert!((alpha - 0.4).abs() < 1e-9);
    }

    #[test]
    fn long_frame_catches_up() {
        let mut ts = FixedTimestep::new(0.01).unwrap();
        let mut dts = Vec::new();
        ts.advance(0.055, |dt| dts.push(dt));
        assert_eq!(dts.len(), 5);
        assert!(dts.iter().all(|&d| d == 0.01));
        assert!(ts.alpha() > 0.0 && ts.alpha() < 1.0);
    }

    #[test]
    fn clock_going_backwards_is_ignored() {
        let mut ts = FixedTimestep::new(0.01).unwrap();
        ts.advance_to(0.1, |_| {});
        let steps = ts.steps();
        ts.advance_to(0.05, |_| {});
        ts.advance(-1.0, |_| {});
        assert_eq!(ts.steps(), steps);
    }

    #[test]
    fn non_positive_step_is_rejected() {
        for dt in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            assert!(FixedTimestep::new(dt).is_err(), "dt={dt}");
        }
    }

    #[test]
    fn default_runs_at_one_hundred_hertz() {
        let mut ts = FixedTimestep::default();
        let mut calls = 0;
        ts.advance(1.0, |_| calls += 1);
        assert_eq!(ts.dt(), DEFAULT_DT);
        assert_eq!(calls, 100);
    }
}
