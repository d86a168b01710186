pub mod driver;
pub mod event;
pub mod input;
pub mod integrator;
pub mod pendulum;
pub mod runner;
pub mod spawn;
pub mod timestep;
pub mod trajectory;

pub use driver::{RocketDriver, ThrusterEffect, ThrusterEffects};
pub use event::{EventKind, SimEvent};
pub use input::{InputSource, InputState, Key};
pub use integrator::{euler_step, predict};
pub use runner::{FlightStatus, Simulation};
pub use timestep::FixedTimestep;
