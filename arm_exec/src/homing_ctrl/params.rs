//! Parameters structure for HomingCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::eqpt::MotionProfile;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for homing control.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Search target commanded at the start of homing. Large and negative so
    /// each joint reaches its switch well before the target.
    ///
    /// Units: actuator steps
    pub search_target_steps: i64,

    /// Distance both joints retract after both switches have asserted.
    ///
    /// Units: actuator steps, positive
    pub backoff_steps: i64,

    /// Tick budget for the whole sequence. Exceeding it aborts homing with
    /// a timeout error and stops both actuators.
    pub max_ticks: u64,

    /// Speed/acceleration profile applied to both actuators during homing.
    /// The caller restores the operating profile afterwards.
    pub homing_profile: MotionProfile,
}
