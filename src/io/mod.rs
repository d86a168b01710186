pub mod csv;
pub mod hud;
pub mod json;

pub use csv::{write_trajectory, write_trajectory_file, PositionLogger, Sample};
pub use hud::HudReadout;
pub use json::{write_summary, write_summary_file, FlightSummary};
