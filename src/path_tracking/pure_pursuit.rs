//! Pure pursuit steering geometry
//!
//! Lookahead-circle relations for a bicycle: the arc through a lookahead
//! point at distance Ld seen under angle alpha has radius Ld / (2 sin alpha),
//! and the steering angle tracking that arc is atan(curvature * wheelbase).
//! The crosstrack error of the proportional lookahead law decays
//! exponentially; the closed form and an RK4 integration are both provided
//! for cross-checking.
//!
//! Ref:
//! - [Automatic Steering Methods for Autonomous Automobile Path Tracking](https://www.ri.cmu.edu/pub_files/2009/2/Automatic_Steering_Methods_for_Autonomous_Automobile_Path_Tracking.pdf)

use crate::common::error::{EstimationError, EstimationResult};

/// Curvature of the arc through the lookahead point: 2 sin(alpha) / Ld.
pub fn curvature(lookahead: f64, alpha: f64) -> EstimationResult<f64> {
    if !(lookahead > 0.0) {
        return Err(EstimationError::InvalidParameter(format!(
            "lookahead distance must be positive, got {}",
            lookahead
        )));
    }
    Ok(2.0 * alpha.sin() / lookahead)
}

/// Turning radius of the lookahead arc; infinite when alpha is zero.
pub fn turning_radius(lookahead: f64, alpha: f64) -> EstimationResult<f64> {
    Ok(1.0 / curvature(lookahead, alpha)?)
}

/// Bicycle steering angle that tracks the lookahead arc.
pub fn steering_angle(lookahead: f64, alpha: f64, wheelbase: f64) -> EstimationResult<f64> {
    if !(wheelbase > 0.0) {
        return Err(EstimationError::InvalidParameter(format!(
            "wheelbase must be positive, got {}",
            wheelbase
        )));
    }
    Ok((curvature(lookahead, alpha)? * wheelbase).atan())
}

/// Closed-form crosstrack decay e(t) = e0 * exp(-k t).
pub fn crosstrack_decay(e0: f64, k: f64, t: f64) -> f64 {
    e0 * (-k * t).exp()
}

/// RK4 integration of e' = -k e, returning the error at every sample
/// (steps + 1 values including the start).
pub fn crosstrack_decay_rk4(e0: f64, k: f64, dt: f64, steps: usize) -> Vec<f64> {
    let f = |e: f64| -k * e;
    let mut e = e0;
    let mut out = Vec::with_capacity(steps + 1);
    out.push(e);
    for _ in 0..steps {
        let k1 = f(e);
        let k2 = f(e + 0.5 * dt * k1);
        let k3 = f(e + 0.5 * dt * k2);
        let k4 = f(e + dt * k3);
        e += dt / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
        out.push(e);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_lookahead_geometry() {
        // Ld = 15, alpha = 60 deg: R = 15 / sqrt(3), delta = atan(L/R) = pi/6
        let radius = turning_radius(15.0, PI / 3.0).unwrap();
        assert!((radius - 15.0 / 3.0_f64.sqrt()).abs() < 1e-12);

        let kappa = curvature(15.0, PI / 3.0).unwrap();
        assert!((kappa * radius - 1.0).abs() < 1e-12);

        let delta = steering_angle(15.0, PI / 3.0, 5.0).unwrap();
        assert!((delta - PI / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_alpha_is_straight() {
        assert_eq!(curvature(10.0, 0.0).unwrap(), 0.0);
        assert!(turning_radius(10.0, 0.0).unwrap().is_infinite());
        assert_eq!(steering_angle(10.0, 0.0, 2.9).unwrap(), 0.0);
    }

    #[test]
    fn test_steering_sign_follows_alpha() {
        let left = steering_angle(10.0, 0.3, 2.9).unwrap();
        let right = steering_angle(10.0, -0.3, 2.9).unwrap();
        assert!(left > 0.0);
        assert!((left + right).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(curvature(0.0, 0.5).is_err());
        assert!(curvature(-1.0, 0.5).is_err());
        assert!(steering_angle(10.0, 0.5, 0.0).is_err());
    }

    #[test]
    fn test_rk4_matches_closed_form() {
        let e0 = 2.0;
        let k = 0.8;
        let dt = 0.1;
        let steps = 50;
        let numeric = crosstrack_decay_rk4(e0, k, dt, steps);
        assert_eq!(numeric.len(), steps + 1);
        for (i, &e) in numeric.iter().enumerate() {
            let exact = crosstrack_decay(e0, k, i as f64 * dt);
            assert!((e - exact).abs() < 1e-5);
        }
    }

    #[test]
    fn test_decay_is_monotone_and_keeps_sign() {
        let trace = crosstrack_decay_rk4(-1.5, 0.5, 0.05, 100);
        for pair in trace.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(pair[1] < 0.0);
        }
    }
}
