//! Linear Kalman filter
//!
//! Constant-velocity tracker over (position, speed) driven by a measured
//! acceleration. Both state components are observed directly, so the
//! observation matrix is the identity.

use nalgebra::{Cholesky, Matrix2, Vector2};

use crate::common::error::{EstimationError, EstimationResult};
use crate::common::traits::StateEstimator;

/// Configuration for the linear Kalman filter
#[derive(Debug, Clone)]
pub struct LinearKfConfig {
    /// Process noise covariance
    pub q: Matrix2<f64>,
    /// Measurement noise covariance
    pub r: Matrix2<f64>,
}

impl Default for LinearKfConfig {
    fn default() -> Self {
        Self {
            q: Matrix2::from_diagonal(&Vector2::new(0.01, 0.01)),
            r: Matrix2::from_diagonal(&Vector2::new(0.01, 0.01)),
        }
    }
}

/// Linear Kalman filter over (position, speed)
pub struct LinearKf {
    state: Vector2<f64>,
    covariance: Matrix2<f64>,
    config: LinearKfConfig,
}

impl LinearKf {
    pub fn new(
        initial_state: Vector2<f64>,
        initial_covariance: Matrix2<f64>,
        config: LinearKfConfig,
    ) -> EstimationResult<Self> {
        if !initial_state.iter().all(|v| v.is_finite())
            || !initial_covariance.iter().all(|v| v.is_finite())
        {
            return Err(EstimationError::NonFinite(
                "initial state or covariance".to_string(),
            ));
        }
        Ok(Self {
            state: initial_state,
            covariance: (initial_covariance + initial_covariance.transpose()) * 0.5,
            config,
        })
    }

    /// Get reference to the current state estimate
    pub fn get_state_vector(&self) -> &Vector2<f64> {
        &self.state
    }

    /// Get reference to the state covariance
    pub fn get_covariance_matrix(&self) -> &Matrix2<f64> {
        &self.covariance
    }

    /// Propagate through the constant-velocity model with an acceleration
    /// input: x <- A x + B a, P <- A P A^T + Q.
    pub fn predict(&mut self, accel: f64, dt: f64) -> EstimationResult<()> {
        if !accel.is_finite() || !dt.is_finite() {
            return Err(EstimationError::NonFinite("acceleration input".to_string()));
        }
        if dt < 0.0 {
            return Err(EstimationError::InvalidParameter(format!(
                "negative dt {} in predict",
                dt
            )));
        }
        let a = Matrix2::new(
            1.0, dt,
            0.0, 1.0,
        );
        let b = Vector2::new(0.5 * dt * dt, dt);
        self.state = a * self.state + b * accel;
        self.covariance = a * self.covariance * a.transpose() + self.config.q;
        self.covariance = (self.covariance + self.covariance.transpose()) * 0.5;
        Ok(())
    }

    /// Update with a direct observation of both state components.
    pub fn update(&mut self, z: &Vector2<f64>) -> EstimationResult<()> {
        if !z.iter().all(|v| v.is_finite()) {
            return Err(EstimationError::NonFinite("measurement".to_string()));
        }
        // H = I, so S = P + R and the gain solve is S K^T = P
        let s = self.covariance + self.config.r;
        let chol = Cholesky::new(s).ok_or_else(|| {
            EstimationError::NumericalError(
                "innovation covariance not positive definite".to_string(),
            )
        })?;
        let k = chol.solve(&self.covariance).transpose();
        let y = z - self.state;
        self.state += k * y;
        self.covariance = (Matrix2::identity() - k) * self.covariance;
        self.covariance = (self.covariance + self.covariance.transpose()) * 0.5;
        Ok(())
    }
}

impl StateEstimator for LinearKf {
    type State = Vector2<f64>;
    type Measurement = Vector2<f64>;
    type Control = f64;

    fn predict(&mut self, control: &Self::Control, dt: f64) {
        if let Err(e) = LinearKf::predict(self, *control, dt) {
            eprintln!("predict failed: {}", e);
        }
    }

    fn update(&mut self, measurement: &Self::Measurement) {
        if let Err(e) = LinearKf::update(self, measurement) {
            eprintln!("update failed: {}", e);
        }
    }

    fn get_state(&self) -> &Self::State {
        &self.state
    }
}
