//! # Arm control library
//!
//! Control core of the 2 degree-of-freedom articulated arm. The library
//! holds the cyclic modules and the telecommand processor; `main.rs` wires
//! them to the equipment and runs the cyclic executive.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Central mutable state record for the executable.
pub mod data_store;

/// Multi-turn encoder tracking (wrap-corrected accumulators per joint).
pub mod enc_ctrl;

/// Dual-joint homing state machine.
pub mod homing_ctrl;

/// Kinematics function library (forward and inverse).
pub mod kin;

/// Executable-level parameters.
pub mod params;

/// Telecommand processor.
pub mod tc_processor;
