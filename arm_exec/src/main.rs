//! Main arm control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - System input acquisition:
//!             - Encoder sensing of both joints
//!         - Telecommand processing and handling
//!         - Streaming telemetry output
//!
//! Telecommands arrive as lines on stdin, read by a dedicated thread so the
//! cyclic loop never blocks on input. Responses go to stdout; log records go
//! to stdout and the session log file.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use arm_lib::{data_store::DataStore, kin::ChainConfig, params::Params, tc_processor};
use eqpt_if::{
    eqpt::{sim::sim_arm, Actuator, AngleSensor, JointId, LimitSwitches},
    tc::ArmTc,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period between two status snapshot saves.
const SNAPSHOT_PERIOD_S: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options for the executable.
#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec", about = "2 DoF arm control executable")]
struct Opt {
    /// Minimum log level (info, debug or trace).
    #[structopt(short = "l", long = "level", default_value = "debug")]
    level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Control Executable\n");
    info!(
        "Software root: {:?}",
        host::get_arm_sw_root().wrap_err("Failed to get the software root")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: Params =
        util::params::load("arm_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATA STORE AND MODULES ----

    let mut ds = DataStore {
        params,
        ..DataStore::default()
    };

    ds.enc_ctrl
        .init("enc_ctrl.toml", &session)
        .wrap_err("Failed to initialise EncCtrl")?;
    ds.homing_ctrl
        .init("homing_ctrl.toml")
        .wrap_err("Failed to initialise HomingCtrl")?;
    ds.chain_config = util::params::load::<ChainConfig>("kin.toml")
        .wrap_err("Could not load kinematic chain config")?;

    info!("All modules initialised");

    // ---- INITIALISE EQUIPMENT ----

    let (mut mech, mut sensor) = sim_arm(ds.params.sim.clone());

    for joint in &JointId::ALL {
        mech.set_profile(*joint, &ds.params.op_profile);
    }

    // Establish the encoder baselines and the provisional Home origin.
    // Until the first homing, reported positions are relative to wherever
    // the arm happens to be powered on.
    ds.calibrate_encoders(&mut sensor)
        .wrap_err("Failed to calibrate the encoders")?;
    ds.recapture_home();

    info!("Equipment initialised, ready for telecommands");

    // ---- TELECOMMAND SOURCE ----

    let tc_rx = spawn_stdin_reader();

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(ds.params.cycle_period_s);
    let cycles_per_snapshot = (SNAPSHOT_PERIOD_S / ds.params.cycle_period_s).max(1.0) as u128;

    loop {
        let cycle_start = Instant::now();
        ds.num_cycles += 1;

        // ---- INPUT ACQUISITION ----

        // A failed sample leaves the accumulators untouched, the next good
        // sample catches up the missed motion.
        if let Err(e) = ds.sample_encoders(&mut sensor) {
            warn!("Encoder sample failed: {}", e);
        }

        // ---- TELECOMMAND PROCESSING ----

        match tc_rx.try_recv() {
            Ok(line) => handle_line(&mut ds, &mut mech, &mut sensor, &line),
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => {
                info!("Telecommand source closed, exiting");
                break;
            }
        }

        // ---- TELEMETRY ----

        if ds.streaming {
            println!("{:.2}\t{:.2}", ds.joint_deg[0], ds.joint_deg[1]);
        }

        if ds.num_cycles % cycles_per_snapshot == 0 {
            session.save("status_report.json", &ds.status_snapshot());
        }

        // ---- CYCLE MANAGEMENT ----

        let elapsed = cycle_start.elapsed();
        match cycle_period.checked_sub(elapsed) {
            Some(remaining) => thread::sleep(remaining),
            None => warn!(
                "Cycle overran by {:.3} ms",
                (elapsed - cycle_period).as_secs_f64() * 1e3
            ),
        }
    }

    Ok(())
}

/// Parse and dispatch one telecommand line.
///
/// While streaming only the stop command is honoured; everything else is
/// answered with a busy line and not executed, so a command typed into a
/// fast telemetry stream can't trigger a blocking move.
fn handle_line<M, S>(ds: &mut DataStore, mech: &mut M, sensor: &mut S, line: &str)
where
    M: Actuator + LimitSwitches,
    S: AngleSensor,
{
    if line.trim().is_empty() {
        return;
    }

    let tc = match ArmTc::from_line(line) {
        Ok(tc) => tc,
        Err(e) => {
            println!("Command error: {}", e);
            return;
        }
    };

    if ds.streaming && tc != ArmTc::StreamStop {
        debug!("Refusing {:?} while streaming", tc);
        println!("Busy streaming, send 'f' to stop first");
        return;
    }

    tc_processor::exec(ds, mech, sensor, &tc);
}

/// Spawn the thread reading telecommand lines from stdin.
///
/// The channel disconnects when stdin reaches end of file, which the main
/// loop treats as a shutdown request.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("Couldn't read from stdin: {}", e);
                    break;
                }
            };

            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use eqpt_if::eqpt::sim::{sim_arm, SimConfig, SimEncoder, SimMech};

    fn line_setup() -> (DataStore, SimMech, SimEncoder) {
        let (mut mech, mut enc) = sim_arm(SimConfig::default());

        let mut ds = DataStore::default();
        ds.calibrate_encoders(&mut enc).unwrap();
        ds.recapture_home();
        tc_processor::exec(&mut ds, &mut mech, &mut enc, &ArmTc::Enable);

        (ds, mech, enc)
    }

    #[test]
    fn test_streaming_refuses_other_commands() {
        let (mut ds, mut mech, mut enc) = line_setup();

        handle_line(&mut ds, &mut mech, &mut enc, "b");
        assert!(ds.streaming);

        // Motion commands arriving mid-stream must not execute
        handle_line(&mut ds, &mut mech, &mut enc, "j 1 100");
        assert_eq!(mech.steps_taken(JointId::J1), 0);
        assert!(ds.streaming);

        // The stop token still works
        handle_line(&mut ds, &mut mech, &mut enc, "f");
        assert!(!ds.streaming);

        // And commands execute normally again afterwards
        handle_line(&mut ds, &mut mech, &mut enc, "j 1 100");
        assert_eq!(mech.steps_taken(JointId::J1), 100);
    }

    #[test]
    fn test_blank_and_malformed_lines_change_nothing() {
        let (mut ds, mut mech, mut enc) = line_setup();

        handle_line(&mut ds, &mut mech, &mut enc, "   ");
        handle_line(&mut ds, &mut mech, &mut enc, "q");
        handle_line(&mut ds, &mut mech, &mut enc, "i ten twenty");

        assert!(!ds.streaming);
        assert_eq!(mech.steps_taken(JointId::J1), 0);
        assert_eq!(mech.steps_taken(JointId::J2), 0);
    }
}
