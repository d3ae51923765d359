//! Forward kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;

// Internal
use super::ChainConfig;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the tool-tip position for a pair of joint angles.
///
/// Standard planar 2R transform with the configured per-joint angular
/// offsets applied before the trigonometry. Total: every input pair maps to
/// exactly one point. The result is in the machine frame; callers subtract
/// the Home origin themselves.
pub fn forward(config: &ChainConfig, th1_deg: f64, th2_deg: f64) -> Point2<f64> {
    let t1 = (th1_deg + config.theta1_offset_deg).to_radians();
    let t2 = (th2_deg + config.theta2_offset_deg).to_radians();

    let l1 = config.shoulder_length_mm;
    let l2 = config.elbow_length_mm;

    Point2::new(
        l1 * t1.cos() + l2 * (t1 + t2).cos(),
        l1 * t1.sin() + l2 * (t1 + t2).sin(),
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_known_poses() {
        let cfg = ChainConfig::default();

        // Fully extended along X
        let p = forward(&cfg, 0.0, 0.0);
        assert!((p.x - 250.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);

        // Elbow folded square: tip at (150, 100)
        let p = forward(&cfg, 0.0, 90.0);
        assert!((p.x - 150.0).abs() < 1e-9);
        assert!((p.y - 100.0).abs() < 1e-9);

        // Shoulder up, straight arm along Y
        let p = forward(&cfg, 90.0, 0.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let cfg = ChainConfig::default();

        let a = forward(&cfg, 12.3456, -78.9012);
        let b = forward(&cfg, 12.3456, -78.9012);

        // Bit-identical, not approximately equal
        assert_eq!(a, b);
    }

    #[test]
    fn test_angular_offsets_shift_the_frame() {
        let offset_cfg = ChainConfig {
            theta1_offset_deg: 90.0,
            theta2_offset_deg: -20.0,
            ..ChainConfig::default()
        };
        let plain_cfg = ChainConfig::default();

        let shifted = forward(&offset_cfg, 0.0, 0.0);
        let reference = forward(&plain_cfg, 90.0, -20.0);

        assert!((shifted.x - reference.x).abs() < 1e-9);
        assert!((shifted.y - reference.y).abs() < 1e-9);
    }
}
