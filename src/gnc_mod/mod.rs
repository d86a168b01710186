pub mod control_loop;
pub mod controller;
pub mod model;

pub use control_loop::{ControlLoop, LoopState};
pub use controller::{Controller, LqrController, ObserverController};
pub use model::LinearStateSpaceModel;
