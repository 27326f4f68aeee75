//! Angle normalization helpers

use std::f64::consts::PI;

/// Wrap an angle to the half-open interval (-pi, pi].
///
/// Values already in range are returned unchanged, so the function is
/// idempotent. Odd multiples of pi map to +pi, never -pi.
pub fn wrap_to_pi(angle: f64) -> f64 {
    if -PI < angle && angle <= PI {
        return angle;
    }
    let rem = angle.rem_euclid(2.0 * PI);
    if rem > PI {
        rem - 2.0 * PI
    } else {
        rem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_in_range_unchanged() {
        assert_eq!(wrap_to_pi(0.0), 0.0);
        assert_eq!(wrap_to_pi(0.5), 0.5);
        assert_eq!(wrap_to_pi(-3.0), -3.0);
        assert_eq!(wrap_to_pi(PI), PI);
    }

    #[test]
    fn test_wrap_odd_pi_maps_to_positive() {
        assert_eq!(wrap_to_pi(-PI), PI);
        assert!((wrap_to_pi(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_to_pi(-3.0 * PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_even_pi_maps_to_zero() {
        assert!(wrap_to_pi(2.0 * PI).abs() < 1e-12);
        assert!(wrap_to_pi(-2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_basic() {
        assert!((wrap_to_pi(4.0) - (4.0 - 2.0 * PI)).abs() < 1e-12);
        assert!((wrap_to_pi(-4.0) - (2.0 * PI - 4.0)).abs() < 1e-12);
        assert!((wrap_to_pi(100.0 * PI + 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_symmetry() {
        for &a in &[0.3, 1.7, 2.9, 4.4, 7.1, 12.6] {
            assert!((wrap_to_pi(-a) + wrap_to_pi(a)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_wrap_idempotent() {
        let mut a = -10.0;
        while a < 10.0 {
            let w = wrap_to_pi(a);
            assert!(-PI < w && w <= PI);
            assert_eq!(wrap_to_pi(w), w);
            a += 0.37;
        }
    }
}
