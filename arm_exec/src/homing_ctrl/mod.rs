//! Homing control module
//!
//! Drives both joints onto their mechanical limit switches, backs them off
//! by a fixed distance and re-zeros the actuator positions. The routine is a
//! tick-driven state machine with a mandatory tick budget, so a stuck or
//! missing switch surfaces as [`HomingCtrlError::Timeout`] instead of
//! blocking forever.

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
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during HomingCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum HomingCtrlError {
    #[error("Homing did not complete within {0} ticks, check the limit switches")]
    Timeout(u64),

    #[error("Homing tick called while no homing sequence is active")]
    NotActive,
}

/// Per-joint homing phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HomingPhase {
    /// Driving towards the limit switch.
    Searching,

    /// Retracting by the backoff distance.
    BackingOff,

    /// Finished, actuator stopped at the backed-off position.
    Done,

    /// Sequence aborted before this joint finished; the actuator was
    /// stopped wherever it was.
    Failed,
}

/// Result of one homing tick.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HomingStatus {
    InProgress,
    Complete,
}
