//! Chain configuration for the kinematics module

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Inverse-kinematics solution selection policy.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ElbowPolicy {
    /// Negative elbow-angle branch.
    ElbowUp,

    /// Positive elbow-angle branch.
    ElbowDown,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Geometry and conventions of the planar 2-link chain.
///
/// Read-only after initialisation. The original firmware builds disagreed on
/// signs and fixed angular offsets between their kinematic formulas; all of
/// them are expressible here by configuration, so exactly one transform is
/// authoritative at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Length of the shoulder link.
    ///
    /// Units: millimeters
    pub shoulder_length_mm: f64,

    /// Length of the elbow link.
    ///
    /// Units: millimeters
    pub elbow_length_mm: f64,

    /// Fixed angular offset added to the joint 1 reading before the
    /// transform.
    ///
    /// Units: degrees
    pub theta1_offset_deg: f64,

    /// Fixed angular offset added to the joint 2 reading before the
    /// transform.
    ///
    /// Units: degrees
    pub theta2_offset_deg: f64,

    /// Which inverse solution branch `i`/`m` commands act on.
    pub elbow_policy: ElbowPolicy,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            shoulder_length_mm: 150.0,
            elbow_length_mm: 100.0,
            theta1_offset_deg: 0.0,
            theta2_offset_deg: 0.0,
            elbow_policy: ElbowPolicy::ElbowUp,
        }
    }
}

impl ChainConfig {
    /// Maximum reachable radius (fully extended).
    ///
    /// Units: millimeters
    pub fn max_reach_mm(&self) -> f64 {
        self.shoulder_length_mm + self.elbow_length_mm
    }

    /// Minimum reachable radius (fully folded).
    ///
    /// Units: millimeters
    pub fn min_reach_mm(&self) -> f64 {
        (self.shoulder_length_mm - self.elbow_length_mm).abs()
    }
}
