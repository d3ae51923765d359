//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use serde::Serialize;

// Internal
use crate::enc_ctrl::{self, EncCtrl, EncCtrlError};
use crate::homing_ctrl::HomingCtrl;
use crate::kin::{forward, ChainConfig};
use crate::params::Params;
use eqpt_if::eqpt::{AngleSensor, JointId, NUM_JOINTS};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
///
/// Owns every piece of mutable control state. The accumulators inside
/// `enc_ctrl` are written only through [`DataStore::sample_encoders`] and
/// [`DataStore::calibrate_encoders`]; the Home origin only through
/// [`DataStore::recapture_home`]. Everything else reads.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Executable parameters
    pub params: Params,

    // Modules
    pub enc_ctrl: EncCtrl,
    pub enc_ctrl_status_rpt: enc_ctrl::StatusReport,
    pub homing_ctrl: HomingCtrl,

    // Kinematics configuration (read-only after init)
    pub chain_config: ChainConfig,

    /// Joint angles of the last completed sample.
    ///
    /// Units: output-shaft degrees
    pub joint_deg: [f64; NUM_JOINTS],

    /// Cartesian origin captured at the last successful homing. Before the
    /// first homing this is the zero-angle pose, and reported positions are
    /// not absolute.
    pub home_origin_mm: Point2<f64>,

    /// True while continuous position streaming is active.
    pub streaming: bool,

    /// True while actuator driver power is enabled.
    pub power_enabled: bool,
}

/// Periodic status snapshot saved into the session directory.
#[derive(Serialize)]
pub struct StatusSnapshot {
    pub num_cycles: u128,
    pub joint_deg: [f64; NUM_JOINTS],
    pub streaming: bool,
    pub power_enabled: bool,
    pub enc_ctrl: enc_ctrl::StatusReport,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for DataStore {
    fn default() -> Self {
        DataStore {
            num_cycles: 0,
            params: Params::default(),
            enc_ctrl: EncCtrl::default(),
            enc_ctrl_status_rpt: enc_ctrl::StatusReport::default(),
            homing_ctrl: HomingCtrl::default(),
            chain_config: ChainConfig::default(),
            joint_deg: [0.0; NUM_JOINTS],
            home_origin_mm: Point2::origin(),
            streaming: false,
            power_enabled: false,
        }
    }
}

impl DataStore {
    /// Sample both joints' encoders and update the last completed sample.
    ///
    /// Both raws are acquired before any processing, so a status report
    /// never observes a partially-updated accumulator pair.
    pub fn sample_encoders<S: AngleSensor>(
        &mut self,
        sensor: &mut S,
    ) -> Result<(), EncCtrlError> {
        let input = enc_ctrl::InputData {
            raw: self.read_both(sensor)?,
        };

        let (deg, report) = self.enc_ctrl.proc(&input)?;
        self.joint_deg = deg;
        self.enc_ctrl_status_rpt = report;

        Ok(())
    }

    /// Zero-calibrate both encoders against freshly sampled raw angles.
    pub fn calibrate_encoders<S: AngleSensor>(
        &mut self,
        sensor: &mut S,
    ) -> Result<(), EncCtrlError> {
        let raw = self.read_both(sensor)?;
        self.enc_ctrl.reset_zero(raw);
        self.joint_deg = [0.0; NUM_JOINTS];

        Ok(())
    }

    /// Recapture the Home origin as the Cartesian pose of the zero angles.
    pub fn recapture_home(&mut self) {
        self.home_origin_mm = forward(&self.chain_config, 0.0, 0.0);
    }

    /// Tool-tip position of the last completed sample, in the machine
    /// frame.
    pub fn current_position_mm(&self) -> Point2<f64> {
        forward(&self.chain_config, self.joint_deg[0], self.joint_deg[1])
    }

    /// Build the periodic status snapshot.
    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            num_cycles: self.num_cycles,
            joint_deg: self.joint_deg,
            streaming: self.streaming,
            power_enabled: self.power_enabled,
            enc_ctrl: self.enc_ctrl_status_rpt,
        }
    }

    fn read_both<S: AngleSensor>(
        &mut self,
        sensor: &mut S,
    ) -> Result<[u16; NUM_JOINTS], EncCtrlError> {
        Ok([
            sensor.read_raw(JointId::J1)?,
            sensor.read_raw(JointId::J2)?,
        ])
    }
}
