//! # Equipment interface crate.
//!
//! Provides the common equipment and telecommand interfaces for the arm
//! control software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Equipment abstractions (actuators, angle sensors, limit switches)
pub mod eqpt;

/// Telecommand definitions and line parsing
pub mod tc;
