//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the shortest signed delta between two readings of a cyclic counter
/// with the given modulus.
///
/// The result is in the range `[-modulus/2, modulus/2]`. This is only
/// meaningful if the true change between the two readings is less than half
/// the modulus, which the caller must guarantee by sampling fast enough.
pub fn cyclic_delta(new: i32, old: i32, modulus: i32) -> i32 {
    let mut delta = new - old;

    if delta > modulus / 2 {
        delta -= modulus;
    }
    if delta < -modulus / 2 {
        delta += modulus;
    }

    delta
}

/// Arccosine with an explicit domain guard.
///
/// Returns `None` if `value` lies outside `[-1, 1]` by more than `epsilon`.
/// Values within `epsilon` of the boundary are clamped onto it, which
/// absorbs floating point overshoot of the boundary by a few ULPs without
/// ever accepting a genuinely out-of-domain input.
pub fn clamped_acos<T>(value: T, epsilon: T) -> Option<T>
where
    T: Float,
{
    let one = T::from(1.0)?;

    if value.abs() > one + epsilon {
        return None;
    }

    Some(value.min(one).max(-one).acos())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cyclic_delta() {
        // Small motions in either direction
        assert_eq!(cyclic_delta(10, 5, 4096), 5);
        assert_eq!(cyclic_delta(5, 10, 4096), -5);

        // Motion across the wrap point
        assert_eq!(cyclic_delta(2, 4094, 4096), 4);
        assert_eq!(cyclic_delta(4094, 2, 4096), -4);

        // Exactly half a revolution is left uncorrected
        assert_eq!(cyclic_delta(2048, 0, 4096), 2048);

        // No motion
        assert_eq!(cyclic_delta(1234, 1234, 4096), 0);
    }

    #[test]
    fn test_clamped_acos() {
        // In-domain values pass straight through
        assert_eq!(clamped_acos(1.0f64, 1e-6), Some(0.0));
        assert!((clamped_acos(0.0f64, 1e-6).unwrap() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        // ULP overshoot is clamped onto the boundary
        assert_eq!(clamped_acos(1.0 + 1e-9, 1e-6), Some(0.0));
        assert!((clamped_acos(-1.0 - 1e-9, 1e-6).unwrap() - std::f64::consts::PI).abs() < 1e-12);

        // Genuinely out-of-domain values are rejected
        assert_eq!(clamped_acos(1.1f64, 1e-6), None);
        assert_eq!(clamped_acos(-1.1f64, 1e-6), None);
    }
}
