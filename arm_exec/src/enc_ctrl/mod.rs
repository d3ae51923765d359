//! Encoder tracking module
//!
//! Unwraps the 12-bit cyclic raw angle of each joint's sensor into a signed
//! multi-turn accumulator and converts it to output-shaft degrees.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Sensor-shaft degrees per sensor count.
pub const DEG_PER_COUNT: f64 = 360.0 / 4096.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during EncCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum EncCtrlError {
    #[error("Could not read the angle sensor: {0}")]
    SensorRead(#[from] eqpt_if::eqpt::SensorError),

    #[error("Encoders have not been zero-calibrated yet")]
    NotCalibrated,
}
