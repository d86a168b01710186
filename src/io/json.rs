use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sim::event::{EventKind, LandingOutcome, SimEvent};
use super::csv::Sample;

/// An event as it appears in the summary.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub time: f64,
    pub kind: EventKind,
}

/// Summary statistics computed from a recorded run.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub ticks: usize,
    pub flight_time: f64,
    pub start_height: f64,
    pub max_height: f64,
    pub max_descent_speed: f64,
    pub final_height: f64,
    pub final_vertical_speed: f64,
    pub final_rotation_deg: f64,
    pub outcome: Option<LandingOutcome>,
    pub events: Vec<EventRecord>,
}

impl FlightSummary {
    /// `None` for an empty recording.
    pub fn from_samples(samples: &[Sample], events: &[SimEvent]) -> Option<Self> {
        let first = samples.first()?;
        let last = samples.last()?;

        let max_height = samples
            .iter()
            .map(|s| s.state.y())
            .fold(f64::NEG_INFINITY, f64::max);

        let max_descent_speed = samples
            .iter()
            .map(|s| (-s.state.vy()).max(0.0))
            .fold(0.0_f64, f64::max);

        let outcome = events.iter().rev().find_map(|e| match e.kind {
            EventKind::Landed(o) => Some(o),
            _ => None,
        });

        Some(FlightSummary {
            ticks: samples.len(),
            flight_time: last.time - first.time,
            start_height: first.state.y(),
            max_height,
            max_descent_speed,
            final_height: last.state.y(),
            final_vertical_speed: last.state.vy(),
            final_rotation_deg: last.state.theta_degrees(),
            outcome,
            events: events
                .iter()
                .map(|e| EventRecord { time: e.time, kind: e.kind.clone() })
                .collect(),
        })
    }
}

/// Write flight summary as pretty JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Write flight summary JSON to a file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &FlightSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
