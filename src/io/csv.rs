use std::io::{self, Write};
use std::path::Path;

use nalgebra::Vector2;
use tracing::debug;

use crate::dynamics::state::StateVector;

/// One recorded tick of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub state: StateVector,
}

/// Write trajectory data to CSV format.
///
/// Columns: time, pos_x, vel_x, pos_y, vel_y, theta_deg, omega_deg_s
pub fn write_trajectory<W: Write>(writer: &mut W, trajectory: &[Sample]) -> io::Result<()> {
    writeln!(writer, "time,pos_x,vel_x,pos_y,vel_y,theta_deg,omega_deg_s")?;

    for s in trajectory {
        let st = &s.state;
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4}",
            s.time,
            st.x(), st.vx(),
            st.y(), st.vy(),
            st.theta_degrees(),
            st.omega(),
        )?;
    }

    Ok(())
}

/// Write trajectory to a CSV file at the given path.
pub fn write_trajectory_file(path: impl AsRef<Path>, trajectory: &[Sample]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, trajectory)
}

// ---------------------------------------------------------------------------
// Sampled position logger
// ---------------------------------------------------------------------------

/// Logs `t,XPos,YPos` at a fixed sample rate for a fixed run time.
///
/// Sample `k` is labelled `k / rate` but taken once `(k + 1) / rate` seconds
/// have passed. Samples `0..=run_time * rate` are written, then the logger
/// stops.
pub struct PositionLogger<W: Write> {
    writer: W,
    samples_per_second: u32,
    total: u32,
    next: u32,
}

impl<W: Write> PositionLogger<W> {
    /// Writes the header immediately.
    pub fn new(mut writer: W, run_time: u32, samples_per_second: u32) -> io::Result<Self> {
        writeln!(writer, "t,XPos,YPos")?;
        let samples_per_second = samples_per_second.max(1);
        Ok(Self {
            writer,
            samples_per_second,
            total: run_time.saturating_mul(samples_per_second).saturating_add(1),
            next: 0,
        })
    }

    pub fn samples_written(&self) -> u32 {
        self.next
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.total
    }

    /// Record every sample now due at time `now`. Returns true once done.
    pub fn observe(&mut self, now: f64, position: Vector2<f64>) -> io::Result<bool> {
        let rate = f64::from(self.samples_per_second);
        while !self.is_done() && f64::from(self.next + 1) <= now * rate + 1e-9 {
            debug!(entry = self.next, of = self.total - 1, "collecting position sample");
            writeln!(
                self.writer,
                "{},{},{}",
                f64::from(self.next) / rate,
                position.x,
                position.y
            )?;
            self.next += 1;
        }
        Ok(self.is_done())
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
