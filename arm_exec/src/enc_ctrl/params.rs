//! Parameters structure for EncCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::eqpt::NUM_JOINTS;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for encoder tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Sensor-shaft to output-shaft reduction ratio per joint (e.g. 92/16).
    ///
    /// Units: dimensionless, sensor revolutions per joint revolution.
    pub gear_ratio: [f64; NUM_JOINTS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Params {
            gear_ratio: [1.0; NUM_JOINTS],
        }
    }
}
