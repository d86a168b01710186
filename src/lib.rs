pub mod config;
pub mod dynamics;
pub mod error;
mod gnc_mod;
pub mod io;
pub mod sim;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

pub use config::LanderConfig;
pub use error::{LanderError, Result};
