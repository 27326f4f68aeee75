//! SISO transfer function simulation
//!
//! Realizes a strictly proper transfer function in controllable canonical
//! state-space form and integrates its step response with RK4.

use nalgebra::{DMatrix, DVector};

use crate::common::error::{EstimationError, EstimationResult};

/// Strictly proper SISO transfer function in state-space form
#[derive(Debug, Clone)]
pub struct TransferFunction {
    a: DMatrix<f64>,
    b: DVector<f64>,
    c: DVector<f64>,
    numerator: Vec<f64>,
    denominator: Vec<f64>,
}

impl TransferFunction {
    /// Build from numerator and denominator coefficients, highest power
    /// first. The numerator degree must be strictly smaller than the
    /// denominator degree and the leading denominator coefficient nonzero.
    pub fn new(numerator: &[f64], denominator: &[f64]) -> EstimationResult<Self> {
        if numerator.is_empty() || denominator.len() < 2 {
            return Err(EstimationError::InvalidParameter(
                "transfer function needs a numerator and a denominator of degree one or more"
                    .to_string(),
            ));
        }
        if denominator[0] == 0.0 {
            return Err(EstimationError::InvalidParameter(
                "leading denominator coefficient must be nonzero".to_string(),
            ));
        }
        if numerator.len() >= denominator.len() {
            return Err(EstimationError::InvalidParameter(
                "transfer function must be strictly proper".to_string(),
            ));
        }
        if !numerator.iter().all(|v| v.is_finite())
            || !denominator.iter().all(|v| v.is_finite())
        {
            return Err(EstimationError::NonFinite(
                "transfer function coefficients".to_string(),
            ));
        }

        let lead = denominator[0];
        let den: Vec<f64> = denominator.iter().map(|d| d / lead).collect();
        let mut num = vec![0.0; denominator.len() - 1 - numerator.len()];
        num.extend(numerator.iter().map(|n| n / lead));

        // Controllable canonical form: the companion matrix of the
        // denominator with the numerator coefficients on the output row
        let n = den.len() - 1;
        let mut a = DMatrix::zeros(n, n);
        for i in 0..n - 1 {
            a[(i, i + 1)] = 1.0;
        }
        for j in 0..n {
            a[(n - 1, j)] = -den[n - j];
        }
        let mut b = DVector::zeros(n);
        b[n - 1] = 1.0;
        let c = DVector::from_fn(n, |j, _| num[n - 1 - j]);

        Ok(Self { a, b, c, numerator: num, denominator: den })
    }

    /// State dimension
    pub fn order(&self) -> usize {
        self.denominator.len() - 1
    }

    /// Steady-state gain for a unit step; infinite for integrating systems.
    pub fn dc_gain(&self) -> f64 {
        let num0 = *self.numerator.last().unwrap_or(&0.0);
        let den0 = *self.denominator.last().unwrap_or(&1.0);
        num0 / den0
    }

    fn output(&self, x: &DVector<f64>) -> f64 {
        self.c.dot(x)
    }

    fn derivative(&self, x: &DVector<f64>, u: f64) -> DVector<f64> {
        &self.a * x + &self.b * u
    }

    fn rk4_step(&self, x: &DVector<f64>, u: f64, dt: f64) -> DVector<f64> {
        let k1 = self.derivative(x, u);
        let k2 = self.derivative(&(x + &k1 * (0.5 * dt)), u);
        let k3 = self.derivative(&(x + &k2 * (0.5 * dt)), u);
        let k4 = self.derivative(&(x + &k3 * dt), u);
        x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
    }

    /// Unit step response as (t, y) samples, integrated with RK4.
    pub fn step_response(&self, duration: f64, dt: f64) -> EstimationResult<Vec<(f64, f64)>> {
        if duration <= 0.0 || dt <= 0.0 {
            return Err(EstimationError::InvalidParameter(
                "duration and dt must be positive".to_string(),
            ));
        }
        let steps = (duration / dt).round() as usize;
        let mut x = DVector::zeros(self.order());
        let mut response = Vec::with_capacity(steps + 1);
        response.push((0.0, self.output(&x)));
        for k in 1..=steps {
            x = self.rk4_step(&x, 1.0, dt);
            response.push((k as f64 * dt, self.output(&x)));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_order_matches_closed_form() {
        // G(s) = 2 / (s + 2), step response y(t) = 1 - exp(-2t)
        let tf = TransferFunction::new(&[2.0], &[1.0, 2.0]).unwrap();
        assert_eq!(tf.order(), 1);
        let response = tf.step_response(3.0, 0.01).unwrap();
        for &(t, y) in &response {
            let exact = 1.0 - (-2.0 * t).exp();
            assert!((y - exact).abs() < 1e-6);
        }
    }

    #[test]
    fn test_second_order_settles_to_dc_gain() {
        // G(s) = 1 / (s^2 + 4s + 20): dc gain 0.05
        let tf = TransferFunction::new(&[1.0], &[1.0, 4.0, 20.0]).unwrap();
        assert!((tf.dc_gain() - 0.05).abs() < 1e-12);

        let response = tf.step_response(10.0, 0.01).unwrap();
        let (_, y_final) = *response.last().unwrap();
        assert!((y_final - 0.05).abs() < 1e-6);

        // Underdamped: the response overshoots its final value
        let y_max = response.iter().map(|&(_, y)| y).fold(f64::MIN, f64::max);
        assert!(y_max > 0.05);
    }

    #[test]
    fn test_leading_coefficient_normalization() {
        // 2 / (2s + 4) is the same system as 1 / (s + 2)
        let scaled = TransferFunction::new(&[2.0], &[2.0, 4.0]).unwrap();
        let plain = TransferFunction::new(&[1.0], &[1.0, 2.0]).unwrap();
        let a = scaled.step_response(1.0, 0.01).unwrap();
        let b = plain.step_response(1.0, 0.01).unwrap();
        for (&(_, ya), &(_, yb)) in a.iter().zip(b.iter()) {
            assert!((ya - yb).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rejects_improper_or_degenerate() {
        assert!(TransferFunction::new(&[1.0, 0.0], &[1.0, 1.0]).is_err());
        assert!(TransferFunction::new(&[1.0], &[0.0, 1.0]).is_err());
        assert!(TransferFunction::new(&[1.0], &[1.0]).is_err());
        let tf = TransferFunction::new(&[1.0], &[1.0, 1.0]).unwrap();
        assert!(tf.step_response(0.0, 0.01).is_err());
        assert!(tf.step_response(1.0, -0.01).is_err());
    }
}
