//! Kinematics module
//!
//! Pure function library converting between joint-angle space and Cartesian
//! tool-tip coordinates for the planar 2-link chain. All functions are
//! stateless over an immutable [`ChainConfig`]; angles are radians
//! internally and degrees at the public boundary. Actuator step units never
//! appear here, that conversion belongs to the telecommand processor.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod forward;
mod inverse;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
pub use forward::*;
pub use inverse::*;
pub use params::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Numerical noise floor on the target radius. Below this the angle-based
/// inverse formulation is undefined and the target is reported out of reach.
pub const R_EPSILON_MM: f64 = 1e-6;

/// Tolerance on the elbow cosine exceeding the `[-1, 1]` domain. Absorbs
/// floating point overshoot by a few ULPs at the reach boundary; anything
/// beyond it is a genuinely unreachable target.
pub const COS_DOMAIN_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during kinematics calculations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum KinError {
    #[error("OUT_OF_REACH: target ({x_mm:.1}, {y_mm:.1}) mm")]
    OutOfReach { x_mm: f64, y_mm: f64 },
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pair of joint angles.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    /// Shoulder angle.
    ///
    /// Units: degrees
    pub th1_deg: f64,

    /// Elbow angle.
    ///
    /// Units: degrees
    pub th2_deg: f64,
}

/// Both mathematically valid solutions of the inverse problem.
///
/// The caller picks one through [`IkSolutions::select`]; which branch to use
/// is an explicit configuration choice, never an accident of formula
/// ordering.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct IkSolutions {
    pub elbow_up: JointAngles,
    pub elbow_down: JointAngles,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IkSolutions {
    /// Select the solution named by the given policy.
    pub fn select(&self, policy: ElbowPolicy) -> JointAngles {
        match policy {
            ElbowPolicy::ElbowUp => self.elbow_up,
            ElbowPolicy::ElbowDown => self.elbow_down,
        }
    }
}
