use serde::Serialize;

use crate::dynamics::state::StateVector;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Which correction loop an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopKind {
    Observer,
    Lqr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResetReason {
    ResetKey,
    BelowWorldBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LandingOutcome {
    Safe,
    Crashed,
}

/// Kinds of simulation events.
///
/// Resets are reported rather than performed: whoever owns the scene
/// decides how to restart the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventKind {
    ControllerConverged(LoopKind),
    ControllerCancelled(LoopKind),
    ResetRequested(ResetReason),
    Touchdown,
    Landed(LandingOutcome),
}

impl EventKind {
    /// The loop that converged, if this is a convergence event.
    pub fn converged_loop(&self) -> Option<LoopKind> {
        match self {
            EventKind::ControllerConverged(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    pub state: StateVector,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive states and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &StateVector, current: &StateVector) -> Option<EventKind>;
}

/// Requests a reset every step the rocket is below the world's floor.
pub struct WorldBoundDetector {
    pub lower_bound: f64,
}

impl EventDetector for WorldBoundDetector {
    fn check(&mut self, _prev: &StateVector, current: &StateVector) -> Option<EventKind> {
        (current.y() < self.lower_bound).then_some(EventKind::ResetRequested(ResetReason::BelowWorldBound))
    }
}

/// Detects the rocket descending through a pad height, once.
pub struct TouchdownDetector {
    pub height: f64,
    fired: bool,
}

impl TouchdownDetector {
    pub fn new(height: f64) -> Self {
        Self { height, fired: false }
    }
}

impl EventDetector for TouchdownDetector {
    fn check(&mut self, prev: &StateVector, current: &StateVector) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        if prev.y() > self.height && current.y() <= self.height {
            self.fired = true;
            Some(EventKind::Touchdown)
        } else {
            None
        }
    }
}
