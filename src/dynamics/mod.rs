pub mod body;
pub mod state;

pub use body::{Body2D, RigidBody};
pub use state::{wrap_degrees, StateVector};
