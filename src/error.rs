//! Error types for the lander simulation.

use thiserror::Error;

/// Errors raised while assembling or configuring a simulation run.
///
/// All of these are fatal at assembly time: a run either starts fully
/// configured or not at all.
#[derive(Debug, Error)]
pub enum LanderError {
    /// A required engine mount point was not configured.
    #[error(
        "engine `{0}` is not defined; check the `engines` section and make sure all engines are defined"
    )]
    MissingEngine(&'static str),

    /// Matrix tables or vectors with incompatible shapes.
    #[error("dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Which table or operand was malformed.
        what: &'static str,
        /// Expected shape.
        expected: String,
        /// Shape actually supplied.
        found: String,
    },

    /// A configuration value is outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reading a configuration file or writing an export failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl LanderError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates a dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(
        what: &'static str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::DimensionMismatch {
            what,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LanderError>;
