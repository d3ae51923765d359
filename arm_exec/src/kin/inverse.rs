//! Inverse kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{ChainConfig, IkSolutions, JointAngles, KinError, COS_DOMAIN_EPSILON, R_EPSILON_MM};
use util::maths::clamped_acos;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute both joint-angle solutions reaching the given tool-tip point.
///
/// Uses the law-of-cosines elbow angle: targets whose elbow cosine lies
/// outside `[-1, 1]` by more than [`COS_DOMAIN_EPSILON`] are unreachable
/// given the link lengths and reported as such, never clamped into reach.
/// The origin itself is rejected via [`R_EPSILON_MM`], the shoulder angle
/// is undefined there.
///
/// The point is in the machine frame (Home already added back by the
/// caller). Returned angles have the configured offsets removed, so
/// `forward` of either solution reproduces the input point.
pub fn inverse(config: &ChainConfig, x_mm: f64, y_mm: f64) -> Result<IkSolutions, KinError> {
    let out_of_reach = KinError::OutOfReach { x_mm, y_mm };

    let r_squared = x_mm * x_mm + y_mm * y_mm;
    if r_squared.sqrt() < R_EPSILON_MM {
        return Err(out_of_reach);
    }

    let l1 = config.shoulder_length_mm;
    let l2 = config.elbow_length_mm;

    // Law of cosines for the elbow angle
    let cos_elbow = (r_squared - l1 * l1 - l2 * l2) / (2.0 * l1 * l2);
    let elbow_mag = clamped_acos(cos_elbow, COS_DOMAIN_EPSILON).ok_or(out_of_reach)?;

    Ok(IkSolutions {
        elbow_up: branch(config, x_mm, y_mm, -elbow_mag),
        elbow_down: branch(config, x_mm, y_mm, elbow_mag),
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Derive one solution branch from a signed elbow angle.
fn branch(config: &ChainConfig, x_mm: f64, y_mm: f64, elbow_rad: f64) -> JointAngles {
    let l1 = config.shoulder_length_mm;
    let l2 = config.elbow_length_mm;

    let shoulder_rad = y_mm.atan2(x_mm)
        - (l2 * elbow_rad.sin()).atan2(l1 + l2 * elbow_rad.cos());

    JointAngles {
        th1_deg: shoulder_rad.to_degrees() - config.theta1_offset_deg,
        th2_deg: elbow_rad.to_degrees() - config.theta2_offset_deg,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::forward;
    use super::*;

    const TOL_MM: f64 = 1e-3;

    fn assert_round_trip(cfg: &ChainConfig, x: f64, y: f64) {
        let sol = inverse(cfg, x, y).unwrap();

        for angles in &[sol.elbow_up, sol.elbow_down] {
            let p = forward(cfg, angles.th1_deg, angles.th2_deg);
            assert!(
                (p.x - x).abs() < TOL_MM && (p.y - y).abs() < TOL_MM,
                "round trip of ({}, {}) gave ({}, {})",
                x,
                y,
                p.x,
                p.y
            );
        }
    }

    #[test]
    fn test_round_trip_both_branches() {
        let cfg = ChainConfig::default();

        assert_round_trip(&cfg, 200.0, 50.0);
        assert_round_trip(&cfg, -120.0, 130.0);
        assert_round_trip(&cfg, 60.0, -60.0);
        assert_round_trip(&cfg, 0.0, 180.0);
    }

    #[test]
    fn test_round_trip_with_offsets() {
        let cfg = ChainConfig {
            theta1_offset_deg: 15.0,
            theta2_offset_deg: 20.0,
            ..ChainConfig::default()
        };

        assert_round_trip(&cfg, 180.0, -40.0);
        assert_round_trip(&cfg, -90.0, 150.0);
    }

    #[test]
    fn test_branches_differ_for_interior_points() {
        let cfg = ChainConfig::default();

        let sol = inverse(&cfg, 180.0, 60.0).unwrap();
        assert!(sol.elbow_up.th2_deg < 0.0);
        assert!(sol.elbow_down.th2_deg > 0.0);
        assert!((sol.elbow_up.th2_deg + sol.elbow_down.th2_deg).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_reach_annulus() {
        let cfg = ChainConfig::default();

        // Beyond full extension (r > 250)
        assert!(inverse(&cfg, 260.0, 0.0).is_err());
        assert!(inverse(&cfg, 200.0, 200.0).is_err());

        // Inside the folded radius (r < 50)
        assert!(inverse(&cfg, 30.0, 0.0).is_err());
        assert!(inverse(&cfg, 0.0, -49.0).is_err());

        // Strictly inside the annulus both ways
        assert!(inverse(&cfg, 51.0, 0.0).is_ok());
        assert!(inverse(&cfg, 249.0, 0.0).is_ok());
    }

    #[test]
    fn test_reach_boundary_tolerated() {
        let cfg = ChainConfig::default();

        // Exactly at full extension the elbow cosine may overshoot 1 by a
        // few ULPs; the boundary itself must stay reachable
        let sol = inverse(&cfg, cfg.max_reach_mm(), 0.0).unwrap();
        assert!(sol.elbow_up.th2_deg.abs() < 1e-3);

        // A point clearly past the epsilon band must not be "fixed"
        assert!(inverse(&cfg, cfg.max_reach_mm() + 0.1, 0.0).is_err());
    }

    #[test]
    fn test_origin_rejected() {
        let cfg = ChainConfig::default();
        assert_eq!(
            inverse(&cfg, 0.0, 0.0),
            Err(KinError::OutOfReach {
                x_mm: 0.0,
                y_mm: 0.0
            })
        );
    }

    #[test]
    fn test_policy_selection_is_explicit() {
        use super::super::ElbowPolicy;

        let cfg = ChainConfig::default();
        let sol = inverse(&cfg, 180.0, 60.0).unwrap();

        assert_eq!(sol.select(ElbowPolicy::ElbowUp), sol.elbow_up);
        assert_eq!(sol.select(ElbowPolicy::ElbowDown), sol.elbow_down);
    }
}
