//! # Telecommand processor module
//!
//! The telecommand processor maps each parsed command onto the control
//! modules and writes exactly one bounded response per command to the
//! command channel (stdout). It holds no algorithmic state of its own.
//!
//! The degrees-to-steps conversion lives here, at the boundary with the
//! actuator interface; the kinematics module never sees step units.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use nalgebra::Vector2;

// Internal
use crate::data_store::DataStore;
use crate::kin;
use eqpt_if::{
    eqpt::{Actuator, AngleSensor, JointId, LimitSwitches},
    tc::ArmTc,
};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore and commands the equipment. Kinematic and homing
/// failures are recovered here and surfaced as a response line; they never
/// propagate.
pub fn exec<M, S>(ds: &mut DataStore, mech: &mut M, sensor: &mut S, tc: &ArmTc)
where
    M: Actuator + LimitSwitches,
    S: AngleSensor,
{
    debug!("Executing {:?}", tc);

    match tc {
        ArmTc::Home => exec_home(ds, mech, sensor),

        ArmTc::ReportAngles => {
            if !ds.enc_ctrl.is_calibrated() {
                println!("Encoders not calibrated, send 'h' to home");
                return;
            }
            println!("θ1={:.2} θ2={:.2}", ds.joint_deg[0], ds.joint_deg[1]);
        }

        ArmTc::ReportPosition => {
            if !ds.enc_ctrl.is_calibrated() {
                println!("Encoders not calibrated, send 'h' to home");
                return;
            }
            let rel = ds.current_position_mm() - ds.home_origin_mm;
            println!("X_rel={:.1} Y_rel={:.1} dist={:.1}", rel.x, rel.y, rel.norm());
        }

        ArmTc::ReportSteps => {
            println!(
                "M1={} M2={}",
                mech.current_position(JointId::J1),
                mech.current_position(JointId::J2)
            );
        }

        ArmTc::InverseKin { x_mm, y_mm } => match solve_target(ds, *x_mm, *y_mm) {
            Ok(sol) => println!(
                "elbow_up: θ1={:.2} θ2={:.2} | elbow_down: θ1={:.2} θ2={:.2} | policy={:?}",
                sol.elbow_up.th1_deg,
                sol.elbow_up.th2_deg,
                sol.elbow_down.th1_deg,
                sol.elbow_down.th2_deg,
                ds.chain_config.elbow_policy
            ),
            Err(e) => println!("{}", e),
        },

        ArmTc::MoveTo { x_mm, y_mm } => exec_move_to(ds, mech, sensor, *x_mm, *y_mm),

        ArmTc::Jog { joint, steps } => exec_jog(ds, mech, sensor, *joint, *steps),

        ArmTc::Enable => {
            mech.set_power(true);
            ds.power_enabled = true;
            println!("Motors enabled");
        }

        ArmTc::Disable => {
            mech.set_power(false);
            ds.power_enabled = false;
            println!("Motors disabled");
        }

        ArmTc::StreamStart => {
            if ds.streaming {
                println!("Already streaming");
            } else {
                println!("STREAM_START");
                ds.streaming = true;
            }
        }

        ArmTc::StreamStop => {
            if ds.streaming {
                ds.streaming = false;
                println!("STREAM_END");
            } else {
                println!("Not streaming");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the homing sequence, then re-zero the encoders and recapture the
/// Home origin.
fn exec_home<M, S>(ds: &mut DataStore, mech: &mut M, sensor: &mut S)
where
    M: Actuator + LimitSwitches,
    S: AngleSensor,
{
    println!("Homing...");

    let result = ds.homing_ctrl.home(mech);

    // The homing profile applies only for the duration of the sequence
    for joint in &JointId::ALL {
        mech.set_profile(*joint, &ds.params.op_profile);
    }

    match result {
        Ok(()) => match ds.calibrate_encoders(sensor) {
            Ok(()) => {
                ds.recapture_home();
                println!("Homing complete");
            }
            Err(e) => {
                ds.enc_ctrl.invalidate();
                println!("Homing failed: {}", e);
            }
        },
        Err(e) => {
            // The arm has moved far more than half a sensor revolution
            // without being sampled, so the accumulators no longer track
            // the true angles. No re-sample can recover that; the
            // calibration is lost until the next successful homing.
            ds.enc_ctrl.invalidate();
            println!("Homing failed: {}", e);
        }
    }
}

/// Inverse kinematics of a Home-relative target, in the machine frame.
fn solve_target(ds: &DataStore, x_mm: f64, y_mm: f64) -> Result<kin::IkSolutions, kin::KinError> {
    let target = ds.home_origin_mm + Vector2::new(x_mm, y_mm);
    kin::inverse(&ds.chain_config, target.x, target.y)
}

/// Inverse kinematics then a blocking move to the selected solution.
fn exec_move_to<M, S>(ds: &mut DataStore, mech: &mut M, sensor: &mut S, x_mm: f64, y_mm: f64)
where
    M: Actuator + LimitSwitches,
    S: AngleSensor,
{
    if !ds.power_enabled {
        println!("Motors disabled, send 'e' first");
        return;
    }

    // A point move is meaningless against a lost Home origin
    if !ds.enc_ctrl.is_calibrated() {
        println!("Encoders not calibrated, send 'h' to home");
        return;
    }

    let angles = match solve_target(ds, x_mm, y_mm) {
        Ok(sol) => sol.select(ds.chain_config.elbow_policy),
        Err(e) => {
            // No motion is attempted for an unreachable target
            println!("{}", e);
            return;
        }
    };

    mech.move_to(
        JointId::J1,
        (angles.th1_deg * ds.params.steps_per_deg[0]).round() as i64,
    );
    mech.move_to(
        JointId::J2,
        (angles.th2_deg * ds.params.steps_per_deg[1]).round() as i64,
    );

    let completed = run_until_idle(mech, ds.params.move_timeout_ticks);

    // Catch the encoder state up after the blocking window
    catch_up_sample(ds, sensor);

    if completed {
        println!(
            "Move complete: θ1={:.2} θ2={:.2}",
            angles.th1_deg, angles.th2_deg
        );
    } else {
        println!("Move timed out, actuators stopped");
        for joint in &JointId::ALL {
            mech.stop(*joint);
        }
    }
}

/// Jog one actuator by a relative number of steps.
fn exec_jog<M, S>(ds: &mut DataStore, mech: &mut M, sensor: &mut S, joint: JointId, steps: i64)
where
    M: Actuator + LimitSwitches,
    S: AngleSensor,
{
    if !ds.power_enabled {
        println!("Motors disabled, send 'e' first");
        return;
    }

    mech.move_rel(joint, steps);
    let completed = run_until_idle(mech, ds.params.move_timeout_ticks);

    catch_up_sample(ds, sensor);

    if completed {
        println!("Jog complete: {}={}", joint, mech.current_position(joint));
    } else {
        println!("Jog timed out, actuator stopped");
        mech.stop(joint);
    }
}

/// Drive both actuators until neither has distance to go, bounded by the
/// tick budget. Returns true if both went idle.
fn run_until_idle<M: Actuator>(mech: &mut M, max_ticks: u64) -> bool {
    for _ in 0..max_ticks {
        let mut moving = false;

        for joint in &JointId::ALL {
            if mech.distance_to_go(*joint) != 0 {
                mech.run(*joint);
                moving = true;
            }
        }

        if !moving {
            return true;
        }
    }

    false
}

/// Deliberate re-sample of both joints after a blocking operation.
fn catch_up_sample<S: AngleSensor>(ds: &mut DataStore, sensor: &mut S) {
    if let Err(e) = ds.sample_encoders(sensor) {
        warn!("Post-move encoder sample failed: {}", e);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::enc_ctrl::Params as EncParams;
    use crate::homing_ctrl::Params as HomingParams;
    use crate::kin::ChainConfig;
    use eqpt_if::eqpt::sim::{sim_arm, SimConfig, SimEncoder, SimMech};
    use eqpt_if::eqpt::MotionProfile;

    /// A datastore plus simulated equipment, calibrated and powered.
    fn test_setup() -> (DataStore, SimMech, SimEncoder) {
        test_setup_with(
            SimConfig {
                limit_assert_below_steps: [-400, -600],
                counts_per_step: [1.0, 1.0],
                raw_offset_counts: [0, 0],
            },
            50000,
        )
    }

    fn test_setup_with(sim: SimConfig, max_ticks: u64) -> (DataStore, SimMech, SimEncoder) {
        let (mut mech, mut enc) = sim_arm(sim);

        let mut ds = DataStore::default();
        ds.enc_ctrl = crate::enc_ctrl::EncCtrl {
            params: EncParams {
                gear_ratio: [1.0, 1.0],
            },
            ..Default::default()
        };
        ds.homing_ctrl = crate::homing_ctrl::HomingCtrl {
            params: HomingParams {
                search_target_steps: -10000,
                backoff_steps: 200,
                max_ticks,
                homing_profile: MotionProfile {
                    max_speed_steps_s: 300.0,
                    accel_steps_s2: 5000.0,
                },
            },
            ..Default::default()
        };
        ds.chain_config = ChainConfig::default();
        ds.calibrate_encoders(&mut enc).unwrap();
        ds.recapture_home();

        exec(&mut ds, &mut mech, &mut enc, &ArmTc::Enable);

        (ds, mech, enc)
    }

    #[test]
    fn test_enable_disable() {
        let (mut ds, mut mech, mut enc) = test_setup();

        assert!(ds.power_enabled);
        assert!(mech.power_enabled());

        exec(&mut ds, &mut mech, &mut enc, &ArmTc::Disable);
        assert!(!ds.power_enabled);
        assert!(!mech.power_enabled());
    }

    #[test]
    fn test_stream_toggle_has_no_other_side_effects() {
        let (mut ds, mut mech, mut enc) = test_setup();

        let accum_before = (
            ds.enc_ctrl.accumulator(JointId::J1),
            ds.enc_ctrl.accumulator(JointId::J2),
        );

        exec(&mut ds, &mut mech, &mut enc, &ArmTc::StreamStart);
        assert!(ds.streaming);

        exec(&mut ds, &mut mech, &mut enc, &ArmTc::StreamStop);
        assert!(!ds.streaming);

        let accum_after = (
            ds.enc_ctrl.accumulator(JointId::J1),
            ds.enc_ctrl.accumulator(JointId::J2),
        );
        assert_eq!(accum_before, accum_after);
        assert_eq!(mech.steps_taken(JointId::J1), 0);
        assert_eq!(mech.steps_taken(JointId::J2), 0);
    }

    #[test]
    fn test_home_rezeros_everything() {
        let (mut ds, mut mech, mut enc) = test_setup();

        exec(&mut ds, &mut mech, &mut enc, &ArmTc::Home);

        assert_eq!(mech.current_position(JointId::J1), 0);
        assert_eq!(mech.current_position(JointId::J2), 0);
        assert_eq!(ds.enc_ctrl.accumulator(JointId::J1), 0);
        assert_eq!(ds.enc_ctrl.accumulator(JointId::J2), 0);
        assert_eq!(ds.joint_deg, [0.0, 0.0]);

        // The operating profile is back in force after homing
        assert_eq!(mech.profile(JointId::J1), ds.params.op_profile);
        assert_eq!(mech.profile(JointId::J2), ds.params.op_profile);
    }

    #[test]
    fn test_failed_homing_invalidates_calibration() {
        // Switches that can never assert: the sequence times out after the
        // arm has moved thousands of steps without a single encoder sample,
        // far beyond what the wrap correction can track
        let (mut ds, mut mech, mut enc) = test_setup_with(
            SimConfig {
                limit_assert_below_steps: [-20000, -20000],
                counts_per_step: [1.0, 1.0],
                raw_offset_counts: [0, 0],
            },
            5000,
        );

        exec(&mut ds, &mut mech, &mut enc, &ArmTc::Home);

        // The calibration is lost; sampling fails loudly instead of
        // yielding an accumulator that is off by whole revolutions
        assert!(!ds.enc_ctrl.is_calibrated());
        assert!(matches!(
            ds.sample_encoders(&mut enc),
            Err(crate::enc_ctrl::EncCtrlError::NotCalibrated)
        ));

        // Point moves against the lost Home origin are refused
        let steps_before = (
            mech.steps_taken(JointId::J1),
            mech.steps_taken(JointId::J2),
        );
        exec(
            &mut ds,
            &mut mech,
            &mut enc,
            &ArmTc::MoveTo {
                x_mm: -50.0,
                y_mm: 60.0,
            },
        );
        assert_eq!(
            (
                mech.steps_taken(JointId::J1),
                mech.steps_taken(JointId::J2),
            ),
            steps_before
        );
    }

    #[test]
    fn test_move_to_commands_selected_solution() {
        let (mut ds, mut mech, mut enc) = test_setup();

        // Home-relative target; the machine-frame point is home + (x, y)
        let (x_mm, y_mm) = (-50.0, 60.0);
        let target = ds.home_origin_mm + Vector2::new(x_mm, y_mm);
        let expected = kin::inverse(&ds.chain_config, target.x, target.y)
            .unwrap()
            .select(ds.chain_config.elbow_policy);

        exec(&mut ds, &mut mech, &mut enc, &ArmTc::MoveTo { x_mm, y_mm });

        assert_eq!(
            mech.current_position(JointId::J1),
            (expected.th1_deg * ds.params.steps_per_deg[0]).round() as i64
        );
        assert_eq!(
            mech.current_position(JointId::J2),
            (expected.th2_deg * ds.params.steps_per_deg[1]).round() as i64
        );
        assert_eq!(mech.distance_to_go(JointId::J1), 0);
        assert_eq!(mech.distance_to_go(JointId::J2), 0);
    }

    #[test]
    fn test_move_to_unreachable_does_not_move() {
        let (mut ds, mut mech, mut enc) = test_setup();

        exec(
            &mut ds,
            &mut mech,
            &mut enc,
            &ArmTc::MoveTo {
                x_mm: 10000.0,
                y_mm: 0.0,
            },
        );

        assert_eq!(mech.steps_taken(JointId::J1), 0);
        assert_eq!(mech.steps_taken(JointId::J2), 0);
    }

    #[test]
    fn test_move_refused_while_disabled() {
        let (mut ds, mut mech, mut enc) = test_setup();

        exec(&mut ds, &mut mech, &mut enc, &ArmTc::Disable);
        exec(
            &mut ds,
            &mut mech,
            &mut enc,
            &ArmTc::MoveTo {
                x_mm: -50.0,
                y_mm: 60.0,
            },
        );

        assert_eq!(mech.steps_taken(JointId::J1), 0);
        assert_eq!(mech.steps_taken(JointId::J2), 0);
    }

    #[test]
    fn test_jog_moves_relative() {
        let (mut ds, mut mech, mut enc) = test_setup();

        exec(
            &mut ds,
            &mut mech,
            &mut enc,
            &ArmTc::Jog {
                joint: JointId::J2,
                steps: -150,
            },
        );

        assert_eq!(mech.current_position(JointId::J2), -150);
        assert_eq!(mech.current_position(JointId::J1), 0);
    }
}
