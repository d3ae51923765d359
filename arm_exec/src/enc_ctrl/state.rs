//! Implementations for the EncCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{EncCtrlError, Params, DEG_PER_COUNT};
use eqpt_if::eqpt::{JointId, NUM_JOINTS, SENSOR_COUNTS_PER_REV};
use util::{maths::cyclic_delta, module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Encoder tracking module state.
///
/// Owns the multi-turn accumulator and previous-raw baseline of both joints,
/// indexed by [`JointId`]. Nothing else writes these.
#[derive(Default)]
pub struct EncCtrl {
    pub(crate) params: Params,

    /// Wrap-corrected delta sum per joint, in sensor counts. One full
    /// sensor-shaft turn is 4096 counts. Reset only by [`EncCtrl::reset_zero`].
    pub(crate) accum: [i32; NUM_JOINTS],

    /// Raw reading of the previous sample per joint.
    pub(crate) prev_raw: [u16; NUM_JOINTS],

    /// Output-shaft degrees of the last completed sample per joint.
    pub(crate) last_deg: [f64; NUM_JOINTS],

    /// True once `reset_zero` has established a baseline.
    pub(crate) calibrated: bool,
}

/// Input data to EncCtrl: the raw angles of both joints, acquired together
/// by the caller at the start of the cycle.
#[derive(Clone, Copy, Default)]
pub struct InputData {
    /// Raw 12-bit sensor readings, one per joint, in `[0, 4096)`.
    pub raw: [u16; NUM_JOINTS],
}

/// Status report for EncCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug)]
pub struct StatusReport {
    /// True for a joint whose delta crossed the sensor wrap point this
    /// cycle.
    pub wrap_corrected: [bool; NUM_JOINTS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for EncCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = [f64; NUM_JOINTS];
    type StatusReport = StatusReport;
    type ProcError = EncCtrlError;

    /// Initialise the EncCtrl module.
    ///
    /// Expected init data is the path to the parameter file. The module is
    /// not usable until `reset_zero` establishes the first baseline.
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;

        Ok(())
    }

    /// Perform cyclic processing of encoder tracking.
    ///
    /// Accumulates the wrap-corrected delta of each joint and returns the
    /// output-shaft angles in degrees.
    ///
    /// Precondition (not detectable here): the true sensor motion between
    /// consecutive samples is less than half a revolution. If the sampling
    /// interval is too coarse for the joint speed the wrap correction
    /// silently produces a wrong accumulator.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !self.calibrated {
            return Err(EncCtrlError::NotCalibrated);
        }

        let mut report = StatusReport::default();

        for joint in &JointId::ALL {
            let i = joint.index();
            let raw = input_data.raw[i] as i32;
            let prev = self.prev_raw[i] as i32;

            let delta = cyclic_delta(raw, prev, SENSOR_COUNTS_PER_REV);
            report.wrap_corrected[i] = delta != raw - prev;

            self.accum[i] += delta;
            self.prev_raw[i] = input_data.raw[i];
            self.last_deg[i] = self.accum[i] as f64 * DEG_PER_COUNT / self.params.gear_ratio[i];
        }

        Ok((self.last_deg, report))
    }
}

impl EncCtrl {
    /// Zero-calibrate both joints against freshly sampled raw angles.
    ///
    /// Sets the raw readings as the new previous-raw baselines and clears
    /// the accumulators. Must be called once at process start and once
    /// after every successful homing.
    pub fn reset_zero(&mut self, raw: [u16; NUM_JOINTS]) {
        self.prev_raw = raw;
        self.accum = [0; NUM_JOINTS];
        self.last_deg = [0.0; NUM_JOINTS];
        self.calibrated = true;
    }

    /// Mark the calibration as lost.
    ///
    /// Used when the arm may have moved further than the wrap correction
    /// can track, e.g. during a failed homing sequence. Subsequent samples
    /// fail with [`EncCtrlError::NotCalibrated`] until `reset_zero`
    /// establishes a new baseline.
    pub fn invalidate(&mut self) {
        self.calibrated = false;
    }

    /// True while a zero-calibration baseline is in force.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Output-shaft angle of the last completed sample.
    ///
    /// Units: degrees
    pub fn degrees(&self, joint: JointId) -> f64 {
        self.last_deg[joint.index()]
    }

    /// Raw accumulator value of a joint, in sensor counts.
    pub fn accumulator(&self, joint: JointId) -> i32 {
        self.accum[joint.index()]
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn enc_with_ratio(ratio: f64) -> EncCtrl {
        let mut enc = EncCtrl {
            params: Params {
                gear_ratio: [ratio; NUM_JOINTS],
            },
            ..EncCtrl::default()
        };
        enc.reset_zero([0, 0]);
        enc
    }

    fn proc_raw(enc: &mut EncCtrl, raw: [u16; NUM_JOINTS]) -> [f64; NUM_JOINTS] {
        let (deg, _) = enc.proc(&InputData { raw }).unwrap();
        deg
    }

    #[test]
    fn test_proc_before_calibration_fails() {
        let mut enc = EncCtrl::default();
        assert!(matches!(
            enc.proc(&InputData::default()),
            Err(EncCtrlError::NotCalibrated)
        ));
    }

    #[test]
    fn test_reset_then_sample_is_zero() {
        let mut enc = enc_with_ratio(5.75);
        enc.reset_zero([1234, 42]);

        let deg = proc_raw(&mut enc, [1234, 42]);
        assert_eq!(enc.accumulator(JointId::J1), 0);
        assert_eq!(enc.accumulator(JointId::J2), 0);
        assert_eq!(deg, [0.0, 0.0]);
    }

    #[test]
    fn test_accumulation_is_lossless_across_wrap() {
        let mut enc = enc_with_ratio(1.0);
        enc.reset_zero([4000, 100]);

        // J1 walks forward across the wrap point, J2 walks backwards across
        // it. Each sample moves less than half a revolution.
        let samples: [[u16; NUM_JOINTS]; 4] = [
            [4090, 10],
            [90, 4006],   // J1 +96 across wrap, J2 -100 across wrap
            [2090, 2006], // J1 +2000, J2 -2000
            [2060, 1906],
        ];
        for raw in &samples {
            proc_raw(&mut enc, *raw);
        }

        // Sum of the true deltas from the baselines
        assert_eq!(enc.accumulator(JointId::J1), 90 + 96 + 2000 - 30);
        assert_eq!(enc.accumulator(JointId::J2), -90 - 100 - 2000 - 100);
    }

    #[test]
    fn test_multi_turn_accumulation() {
        let mut enc = enc_with_ratio(1.0);
        enc.reset_zero([0, 0]);

        // Three full forward revolutions of J1 in quarter-turn samples
        for _ in 0..3 {
            for quarter in 1..=4u16 {
                proc_raw(&mut enc, [(quarter % 4) * 1024, 0]);
            }
        }

        assert_eq!(enc.accumulator(JointId::J1), 3 * 4096);
        assert!((enc.degrees(JointId::J1) - 1080.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalidate_requires_recalibration() {
        let mut enc = enc_with_ratio(1.0);
        proc_raw(&mut enc, [100, 100]);

        enc.invalidate();
        assert!(!enc.is_calibrated());
        assert!(matches!(
            enc.proc(&InputData { raw: [100, 100] }),
            Err(EncCtrlError::NotCalibrated)
        ));

        // A fresh baseline makes the module usable again
        enc.reset_zero([500, 500]);
        let deg = proc_raw(&mut enc, [500, 500]);
        assert_eq!(deg, [0.0, 0.0]);
    }

    #[test]
    fn test_gear_ratio_scales_degrees() {
        let mut enc = enc_with_ratio(5.75);
        enc.reset_zero([0, 0]);

        // One full sensor revolution is 360/5.75 output-shaft degrees
        for quarter in 1..=4u16 {
            proc_raw(&mut enc, [(quarter % 4) * 1024, 0]);
        }

        assert!((enc.degrees(JointId::J1) - 360.0 / 5.75).abs() < 1e-9);
        assert_eq!(enc.degrees(JointId::J2), 0.0);
    }

    #[test]
    fn test_wrap_flag_reported() {
        let mut enc = enc_with_ratio(1.0);
        enc.reset_zero([4090, 1000]);

        let (_, report) = enc.proc(&InputData { raw: [10, 1010] }).unwrap();
        assert!(report.wrap_corrected[0]);
        assert!(!report.wrap_corrected[1]);
    }
}
