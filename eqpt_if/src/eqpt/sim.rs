//! # Simulated Arm Equipment
//!
//! A kinematic simulation of the arm's electromechanics: two stepper
//! actuators that move one step per [`Actuator::run`] call, limit switches
//! that assert below a configured step position, and a geared 12-bit angle
//! sensor driven by the actuator positions.
//!
//! The mechanism state is shared between the actuator and sensor handles
//! via `Rc<RefCell<_>>`; the whole simulation, like the control core, is
//! single threaded.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use super::{Actuator, AngleSensor, JointId, LimitSwitches, MotionProfile, SensorError};
use super::{NUM_JOINTS, SENSOR_COUNTS_PER_REV};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Configuration of the simulated mechanism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// A joint's limit switch asserts while its position is at or below this
    /// step count.
    pub limit_assert_below_steps: [i64; NUM_JOINTS],

    /// Sensor counts per actuator step (gearing between the motor and the
    /// sensor shaft).
    pub counts_per_step: [f64; NUM_JOINTS],

    /// Raw sensor reading when the actuator is at step zero. Lets tests park
    /// a joint right next to the sensor wrap point.
    pub raw_offset_counts: [i32; NUM_JOINTS],
}

/// Shared state of the simulated mechanism.
struct SimState {
    config: SimConfig,
    pos_steps: [i64; NUM_JOINTS],
    target_steps: [i64; NUM_JOINTS],
    profile: [MotionProfile; NUM_JOINTS],
    power_enabled: bool,
    steps_taken: [u64; NUM_JOINTS],
}

/// Simulated actuator pair and limit switches.
pub struct SimMech {
    state: Rc<RefCell<SimState>>,
}

/// Simulated multiplexed angle sensor.
pub struct SimEncoder {
    state: Rc<RefCell<SimState>>,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build a simulated arm, returning the mechanism and sensor handles.
pub fn sim_arm(config: SimConfig) -> (SimMech, SimEncoder) {
    let state = Rc::new(RefCell::new(SimState {
        config,
        pos_steps: [0; NUM_JOINTS],
        target_steps: [0; NUM_JOINTS],
        profile: [MotionProfile::default(); NUM_JOINTS],
        power_enabled: true,
        steps_taken: [0; NUM_JOINTS],
    }));

    (
        SimMech {
            state: state.clone(),
        },
        SimEncoder { state },
    )
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            limit_assert_below_steps: [-400, -600],
            counts_per_step: [1.0; NUM_JOINTS],
            raw_offset_counts: [0; NUM_JOINTS],
        }
    }
}

impl SimMech {
    /// Total number of steps this joint has physically executed.
    pub fn steps_taken(&self, joint: JointId) -> u64 {
        self.state.borrow().steps_taken[joint.index()]
    }

    /// Current physical position of the joint in steps.
    pub fn position(&self, joint: JointId) -> i64 {
        self.state.borrow().pos_steps[joint.index()]
    }

    /// The profile last applied to the joint.
    pub fn profile(&self, joint: JointId) -> MotionProfile {
        self.state.borrow().profile[joint.index()]
    }

    /// True if driver power is currently enabled.
    pub fn power_enabled(&self) -> bool {
        self.state.borrow().power_enabled
    }
}

impl Actuator for SimMech {
    fn move_to(&mut self, joint: JointId, target_steps: i64) {
        self.state.borrow_mut().target_steps[joint.index()] = target_steps;
    }

    fn move_rel(&mut self, joint: JointId, delta_steps: i64) {
        let mut state = self.state.borrow_mut();
        let i = joint.index();
        state.target_steps[i] = state.pos_steps[i] + delta_steps;
    }

    fn run(&mut self, joint: JointId) -> bool {
        let mut state = self.state.borrow_mut();
        let i = joint.index();

        if !state.power_enabled {
            return false;
        }

        let delta = state.target_steps[i] - state.pos_steps[i];
        if delta != 0 {
            state.pos_steps[i] += delta.signum();
            state.steps_taken[i] += 1;
        }

        state.target_steps[i] != state.pos_steps[i]
    }

    fn distance_to_go(&self, joint: JointId) -> i64 {
        let state = self.state.borrow();
        let i = joint.index();
        state.target_steps[i] - state.pos_steps[i]
    }

    fn current_position(&self, joint: JointId) -> i64 {
        self.state.borrow().pos_steps[joint.index()]
    }

    fn set_current_position(&mut self, joint: JointId, steps: i64) {
        let mut state = self.state.borrow_mut();
        let i = joint.index();
        state.pos_steps[i] = steps;
        state.target_steps[i] = steps;
    }

    fn stop(&mut self, joint: JointId) {
        let mut state = self.state.borrow_mut();
        let i = joint.index();
        state.target_steps[i] = state.pos_steps[i];
    }

    fn set_profile(&mut self, joint: JointId, profile: &MotionProfile) {
        self.state.borrow_mut().profile[joint.index()] = *profile;
    }

    fn set_power(&mut self, enabled: bool) {
        self.state.borrow_mut().power_enabled = enabled;
    }
}

impl LimitSwitches for SimMech {
    fn asserted(&self, joint: JointId) -> bool {
        let state = self.state.borrow();
        let i = joint.index();
        state.pos_steps[i] <= state.config.limit_assert_below_steps[i]
    }
}

impl AngleSensor for SimEncoder {
    fn read_raw(&mut self, joint: JointId) -> Result<u16, SensorError> {
        let state = self.state.borrow();
        let i = joint.index();

        let counts = (state.pos_steps[i] as f64 * state.config.counts_per_step[i]).round() as i64
            + state.config.raw_offset_counts[i] as i64;

        Ok(counts.rem_euclid(SENSOR_COUNTS_PER_REV as i64) as u16)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_single_step_motion() {
        let (mut mech, _enc) = sim_arm(SimConfig::default());

        mech.move_to(JointId::J1, 3);
        assert_eq!(mech.distance_to_go(JointId::J1), 3);

        assert!(mech.run(JointId::J1));
        assert!(mech.run(JointId::J1));
        assert!(!mech.run(JointId::J1));

        assert_eq!(mech.current_position(JointId::J1), 3);
        assert_eq!(mech.distance_to_go(JointId::J1), 0);
        assert_eq!(mech.steps_taken(JointId::J1), 3);
    }

    #[test]
    fn test_limit_switch_asserts_below_threshold() {
        let (mut mech, _enc) = sim_arm(SimConfig {
            limit_assert_below_steps: [-2, -2],
            ..SimConfig::default()
        });

        mech.move_to(JointId::J2, -10);
        assert!(!mech.asserted(JointId::J2));

        mech.run(JointId::J2);
        assert!(!mech.asserted(JointId::J2));
        mech.run(JointId::J2);
        assert!(mech.asserted(JointId::J2));
    }

    #[test]
    fn test_encoder_wraps_and_respects_offset() {
        let (mut mech, mut enc) = sim_arm(SimConfig {
            counts_per_step: [1.0, 1.0],
            raw_offset_counts: [4094, 0],
            ..SimConfig::default()
        });

        assert_eq!(enc.read_raw(JointId::J1), Ok(4094));

        // Four steps forward crosses the wrap point
        mech.move_to(JointId::J1, 4);
        while mech.run(JointId::J1) {}
        assert_eq!(enc.read_raw(JointId::J1), Ok(2));

        // Negative positions wrap the other way
        mech.move_to(JointId::J2, -1);
        while mech.run(JointId::J2) {}
        assert_eq!(enc.read_raw(JointId::J2), Ok(4095));
    }

    #[test]
    fn test_power_disable_blocks_motion() {
        let (mut mech, _enc) = sim_arm(SimConfig::default());

        mech.set_power(false);
        mech.move_to(JointId::J1, 5);
        assert!(!mech.run(JointId::J1));
        assert_eq!(mech.current_position(JointId::J1), 0);
    }
}
