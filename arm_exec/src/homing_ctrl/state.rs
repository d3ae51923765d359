//! Implementations for the HomingCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use super::{HomingCtrlError, HomingPhase, HomingStatus, Params};
use eqpt_if::eqpt::{Actuator, JointId, LimitSwitches, NUM_JOINTS};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Homing control module state.
pub struct HomingCtrl {
    pub(crate) params: Params,

    pub(crate) phase: [HomingPhase; NUM_JOINTS],

    /// Tick count of the active sequence.
    pub(crate) ticks: u64,

    pub(crate) active: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for HomingCtrl {
    fn default() -> Self {
        HomingCtrl {
            params: Params::default(),
            phase: [HomingPhase::Done; NUM_JOINTS],
            ticks: 0,
            active: false,
        }
    }
}

impl HomingCtrl {
    /// Initialise the HomingCtrl module from its parameter file.
    pub fn init(&mut self, param_file: &'static str) -> Result<(), params::LoadError> {
        self.params = params::load(param_file)?;

        Ok(())
    }

    /// Start a homing sequence.
    ///
    /// Applies the homing profile and commands both joints towards the
    /// search target. The sequence is then driven by [`HomingCtrl::tick`].
    pub fn start<M: Actuator>(&mut self, mech: &mut M) {
        info!("Homing started");

        for joint in &JointId::ALL {
            mech.set_profile(*joint, &self.params.homing_profile);
            mech.move_to(*joint, self.params.search_target_steps);
            self.phase[joint.index()] = HomingPhase::Searching;
        }

        self.ticks = 0;
        self.active = true;
    }

    /// Advance the homing sequence by one tick.
    ///
    /// Each joint's state machine is independent: a searching joint stops
    /// the instant its own switch asserts, while the other keeps moving.
    /// The backoff retraction only begins once both switches have asserted,
    /// and the sequence completes only when both joints have finished
    /// backing off.
    pub fn tick<M: Actuator + LimitSwitches>(
        &mut self,
        mech: &mut M,
    ) -> Result<HomingStatus, HomingCtrlError> {
        if !self.active {
            return Err(HomingCtrlError::NotActive);
        }

        self.ticks += 1;
        if self.ticks > self.params.max_ticks {
            self.abort(mech);
            return Err(HomingCtrlError::Timeout(self.params.max_ticks));
        }

        if self.any_in_phase(HomingPhase::Searching) {
            self.tick_search(mech);

            // Retraction begins only once both switches have asserted
            if !self.any_in_phase(HomingPhase::Searching) {
                debug!("Both limit switches asserted, backing off");
                for joint in &JointId::ALL {
                    mech.move_rel(*joint, self.params.backoff_steps);
                }
            }

            return Ok(HomingStatus::InProgress);
        }

        self.tick_backoff(mech);

        if self.phase.iter().all(|p| *p == HomingPhase::Done) {
            // Both joints rest at the homed zero position
            for joint in &JointId::ALL {
                mech.set_current_position(*joint, 0);
            }

            self.active = false;
            info!("Homing complete after {} ticks", self.ticks);

            return Ok(HomingStatus::Complete);
        }

        Ok(HomingStatus::InProgress)
    }

    /// Run the homing sequence to completion.
    ///
    /// Blocks the control thread until the sequence completes or the tick
    /// budget is exhausted. The caller must re-zero the encoders and restore
    /// the operating profile after a successful return.
    pub fn home<M: Actuator + LimitSwitches>(
        &mut self,
        mech: &mut M,
    ) -> Result<(), HomingCtrlError> {
        self.start(mech);

        loop {
            if self.tick(mech)? == HomingStatus::Complete {
                return Ok(());
            }
        }
    }

    /// The current phase of a joint's homing state machine.
    pub fn phase(&self, joint: JointId) -> HomingPhase {
        self.phase[joint.index()]
    }

    /// True if any joint is currently in the given phase.
    fn any_in_phase(&self, phase: HomingPhase) -> bool {
        self.phase.iter().any(|p| *p == phase)
    }

    /// Advance every still-searching joint, stopping it if its switch has
    /// asserted.
    fn tick_search<M: Actuator + LimitSwitches>(&mut self, mech: &mut M) {
        for joint in &JointId::ALL {
            let i = joint.index();
            if self.phase[i] != HomingPhase::Searching {
                continue;
            }

            if mech.asserted(*joint) {
                mech.stop(*joint);
                self.phase[i] = HomingPhase::BackingOff;
                debug!("{} limit switch asserted after {} ticks", joint, self.ticks);
            } else {
                mech.run(*joint);
            }
        }
    }

    /// Advance every backing-off joint until its retraction finishes.
    fn tick_backoff<M: Actuator>(&mut self, mech: &mut M) {
        for joint in &JointId::ALL {
            let i = joint.index();
            if self.phase[i] != HomingPhase::BackingOff {
                continue;
            }

            if mech.distance_to_go(*joint) == 0 {
                self.phase[i] = HomingPhase::Done;
            } else {
                mech.run(*joint);
            }
        }
    }

    /// Stop both actuators and deactivate the sequence.
    ///
    /// Joints that had not finished are marked [`HomingPhase::Failed`], so
    /// an aborted sequence is never mistaken for a successful one.
    fn abort<M: Actuator>(&mut self, mech: &mut M) {
        for joint in &JointId::ALL {
            let i = joint.index();
            mech.stop(*joint);
            if self.phase[i] != HomingPhase::Done {
                self.phase[i] = HomingPhase::Failed;
            }
        }
        self.active = false;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
