//! Parameters structure for the arm executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::eqpt::sim::SimConfig;
use eqpt_if::eqpt::{MotionProfile, NUM_JOINTS};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the arm executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Target period of one cycle (one encoder sample of both joints plus
    /// command processing).
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Actuator steps per output-shaft degree, per joint. Only the
    /// telecommand processor converts with this, at the actuator boundary.
    pub steps_per_deg: [f64; NUM_JOINTS],

    /// Tick budget for a blocking point-to-point move or jog.
    pub move_timeout_ticks: u64,

    /// Normal-operation actuator profile, restored after homing.
    pub op_profile: MotionProfile,

    /// Configuration of the simulated equipment the executable runs
    /// against.
    pub sim: SimConfig,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Params {
            cycle_period_s: 0.01,
            steps_per_deg: [25.5556, 24.4444],
            move_timeout_ticks: 2_000_000,
            op_profile: MotionProfile {
                max_speed_steps_s: 5000.0,
                accel_steps_s2: 500.0,
            },
            sim: SimConfig::default(),
        }
    }
}
