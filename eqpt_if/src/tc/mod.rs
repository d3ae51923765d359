//! # Telecommand module
//!
//! This module defines the line-oriented command grammar of the arm: a
//! single-character trigger, optionally followed by whitespace-separated
//! arguments, terminated by a newline. Parsing never touches equipment or
//! module state; a malformed line yields a [`TcParseError`] and nothing
//! else.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use crate::eqpt::JointId;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. one instruction sent to the arm over the command
/// channel.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArmTc {
    /// `h` - run the homing sequence and recapture the Home origin.
    Home,

    /// `p` - report the joint angles of the last completed sample.
    ReportAngles,

    /// `k` - report the Cartesian tool-tip position relative to Home.
    ReportPosition,

    /// `o` - report the raw actuator step positions.
    ReportSteps,

    /// `m <x> <y>` - compute inverse kinematics for a target point without
    /// moving.
    InverseKin {
        /// Target X in millimeters, relative to Home.
        x_mm: f64,
        /// Target Y in millimeters, relative to Home.
        y_mm: f64,
    },

    /// `i <x> <y>` - compute inverse kinematics and move to the target
    /// point.
    MoveTo {
        /// Target X in millimeters, relative to Home.
        x_mm: f64,
        /// Target Y in millimeters, relative to Home.
        y_mm: f64,
    },

    /// `j <joint> <steps>` - jog a single actuator by a relative number of
    /// steps.
    Jog { joint: JointId, steps: i64 },

    /// `e` - enable actuator driver power.
    Enable,

    /// `d` - disable actuator driver power.
    Disable,

    /// `b` - start continuous position streaming.
    StreamStart,

    /// `f` - stop continuous position streaming.
    StreamStop,
}

/// Possible parsing errors.
#[derive(Debug, Error, PartialEq)]
pub enum TcParseError {
    #[error("The command line is empty")]
    Empty,

    #[error("`{0}` is not a recognised command")]
    UnknownCommand(String),

    #[error("Missing argument `{0}`")]
    MissingArg(&'static str),

    #[error("Invalid value `{value}` for argument `{name}`")]
    InvalidArg { name: &'static str, value: String },

    #[error("Unexpected trailing arguments: `{0}`")]
    TrailingArgs(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmTc {
    /// Parse a telecommand from one line of the command channel.
    pub fn from_line(line: &str) -> Result<Self, TcParseError> {
        let mut tokens = line.split_whitespace();

        let trigger = match tokens.next() {
            Some(t) => t,
            None => return Err(TcParseError::Empty),
        };

        let tc = match trigger {
            "h" => ArmTc::Home,
            "p" => ArmTc::ReportAngles,
            "k" => ArmTc::ReportPosition,
            "o" => ArmTc::ReportSteps,
            "e" => ArmTc::Enable,
            "d" => ArmTc::Disable,
            "b" => ArmTc::StreamStart,
            "f" => ArmTc::StreamStop,
            "m" => {
                let x_mm = parse_float(&mut tokens, "x")?;
                let y_mm = parse_float(&mut tokens, "y")?;
                ArmTc::InverseKin { x_mm, y_mm }
            }
            "i" => {
                let x_mm = parse_float(&mut tokens, "x")?;
                let y_mm = parse_float(&mut tokens, "y")?;
                ArmTc::MoveTo { x_mm, y_mm }
            }
            "j" => {
                let joint = parse_joint(&mut tokens)?;
                let steps = parse_int(&mut tokens, "steps")?;
                ArmTc::Jog { joint, steps }
            }
            other => return Err(TcParseError::UnknownCommand(other.to_string())),
        };

        // Every command consumes all of its line
        let rest: Vec<&str> = tokens.collect();
        if !rest.is_empty() {
            return Err(TcParseError::TrailingArgs(rest.join(" ")));
        }

        Ok(tc)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_float<'a, I>(tokens: &mut I, name: &'static str) -> Result<f64, TcParseError>
where
    I: Iterator<Item = &'a str>,
{
    let token = tokens.next().ok_or(TcParseError::MissingArg(name))?;

    token.parse::<f64>().map_err(|_| TcParseError::InvalidArg {
        name,
        value: token.to_string(),
    })
}

fn parse_int<'a, I>(tokens: &mut I, name: &'static str) -> Result<i64, TcParseError>
where
    I: Iterator<Item = &'a str>,
{
    let token = tokens.next().ok_or(TcParseError::MissingArg(name))?;

    token.parse::<i64>().map_err(|_| TcParseError::InvalidArg {
        name,
        value: token.to_string(),
    })
}

fn parse_joint<'a, I>(tokens: &mut I) -> Result<JointId, TcParseError>
where
    I: Iterator<Item = &'a str>,
{
    let token = tokens.next().ok_or(TcParseError::MissingArg("joint"))?;

    token
        .parse::<u8>()
        .ok()
        .and_then(JointId::from_number)
        .ok_or(TcParseError::InvalidArg {
            name: "joint",
            value: token.to_string(),
        })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bare_commands() {
        assert_eq!(ArmTc::from_line("h"), Ok(ArmTc::Home));
        assert_eq!(ArmTc::from_line("p"), Ok(ArmTc::ReportAngles));
        assert_eq!(ArmTc::from_line("k\n"), Ok(ArmTc::ReportPosition));
        assert_eq!(ArmTc::from_line("o"), Ok(ArmTc::ReportSteps));
        assert_eq!(ArmTc::from_line("  e "), Ok(ArmTc::Enable));
        assert_eq!(ArmTc::from_line("d"), Ok(ArmTc::Disable));
        assert_eq!(ArmTc::from_line("b"), Ok(ArmTc::StreamStart));
        assert_eq!(ArmTc::from_line("f"), Ok(ArmTc::StreamStop));
    }

    #[test]
    fn test_point_commands() {
        assert_eq!(
            ArmTc::from_line("m 120.5 -30"),
            Ok(ArmTc::InverseKin {
                x_mm: 120.5,
                y_mm: -30.0
            })
        );
        assert_eq!(
            ArmTc::from_line("i 10 20"),
            Ok(ArmTc::MoveTo {
                x_mm: 10.0,
                y_mm: 20.0
            })
        );
    }

    #[test]
    fn test_jog_command() {
        assert_eq!(
            ArmTc::from_line("j 2 -150"),
            Ok(ArmTc::Jog {
                joint: JointId::J2,
                steps: -150
            })
        );
        assert_eq!(
            ArmTc::from_line("j 3 10"),
            Err(TcParseError::InvalidArg {
                name: "joint",
                value: "3".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_lines_are_rejected() {
        assert_eq!(ArmTc::from_line(""), Err(TcParseError::Empty));
        assert_eq!(ArmTc::from_line("   "), Err(TcParseError::Empty));
        assert_eq!(
            ArmTc::from_line("z"),
            Err(TcParseError::UnknownCommand("z".to_string()))
        );
        assert_eq!(ArmTc::from_line("m 10"), Err(TcParseError::MissingArg("y")));
        assert_eq!(
            ArmTc::from_line("i ten twenty"),
            Err(TcParseError::InvalidArg {
                name: "x",
                value: "ten".to_string()
            })
        );
        assert_eq!(
            ArmTc::from_line("p 1.0"),
            Err(TcParseError::TrailingArgs("1.0".to_string()))
        );
    }
}
