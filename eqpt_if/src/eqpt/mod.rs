//! # Arm Equipment Interfaces
//!
//! This module abstracts over the hardware the control core commands and
//! senses: the two stepper actuators, the multiplexed magnetic angle sensor
//! and the mechanical limit switches. The control core only ever talks to
//! these traits, so the same logic drives real hardware and the simulated
//! equipment in [`sim`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Simulated equipment implementations, used by tests and the sim build.
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of controlled joints on the arm.
pub const NUM_JOINTS: usize = 2;

/// Counts per revolution of the angle sensor (12 bit).
pub const SENSOR_COUNTS_PER_REV: i32 = 4096;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the controlled joints.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum JointId {
    J1,
    J2,
}

/// Possible errors when reading the angle sensor.
#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum SensorError {
    #[error("The sensor bus read failed")]
    BusRead,

    #[error("Could not select the sensor multiplexer channel")]
    ChannelSelect,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A speed/acceleration profile for an actuator.
///
/// Homing uses a slower, stiffer profile than normal operation, so the
/// profile is switchable at runtime through [`Actuator::set_profile`].
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct MotionProfile {
    /// Maximum speed in steps/second.
    pub max_speed_steps_s: f64,

    /// Acceleration in steps/second².
    pub accel_steps_s2: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait providing a unified API for the arm's stepper actuators.
///
/// All positions are in actuator steps. Motion itself (pulse generation and
/// speed profiling) happens behind this trait and is out of scope for the
/// control core.
pub trait Actuator {
    /// Command the actuator towards an absolute step target.
    fn move_to(&mut self, joint: JointId, target_steps: i64);

    /// Command the actuator a relative number of steps from its current
    /// target.
    fn move_rel(&mut self, joint: JointId, delta_steps: i64);

    /// Advance the actuator's motion by at most one step.
    ///
    /// Returns `true` if the actuator is still moving towards its target.
    fn run(&mut self, joint: JointId) -> bool;

    /// Number of steps remaining to the current target (signed).
    fn distance_to_go(&self, joint: JointId) -> i64;

    /// Current absolute position in steps.
    fn current_position(&self, joint: JointId) -> i64;

    /// Redefine the current position as `steps`, without motion.
    fn set_current_position(&mut self, joint: JointId, steps: i64);

    /// Stop the actuator, abandoning the current target.
    fn stop(&mut self, joint: JointId);

    /// Apply a speed/acceleration profile.
    fn set_profile(&mut self, joint: JointId, profile: &MotionProfile);

    /// Enable or disable driver power for all actuators.
    fn set_power(&mut self, enabled: bool);
}

/// Trait for the multiplexed magnetic angle sensor.
pub trait AngleSensor {
    /// Read the instantaneous raw angle of the given joint's sensor channel.
    ///
    /// The value is in `[0, 4096)`, one full sensor revolution.
    fn read_raw(&mut self, joint: JointId) -> Result<u16, SensorError>;
}

/// Trait for the mechanical limit switches used by homing.
pub trait LimitSwitches {
    /// True if the given joint's limit switch is currently pressed.
    fn asserted(&self, joint: JointId) -> bool;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointId {
    /// All joints, in index order.
    pub const ALL: [JointId; NUM_JOINTS] = [JointId::J1, JointId::J2];

    /// The array index backing this joint's state.
    pub fn index(&self) -> usize {
        match self {
            JointId::J1 => 0,
            JointId::J2 => 1,
        }
    }

    /// Get a joint from its 1-based number as used on the command channel.
    pub fn from_number(num: u8) -> Option<Self> {
        match num {
            1 => Some(JointId::J1),
            2 => Some(JointId::J2),
            _ => None,
        }
    }
}

impl std::fmt::Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            JointId::J1 => write!(f, "J1"),
            JointId::J2 => write!(f, "J2"),
        }
    }
}
