//! Common traits defining interfaces for estimation algorithms

use crate::common::types::PoseEstimate;

/// Trait for state estimation algorithms (KF, EKF, ...)
///
/// This is the infallible facade shared by the filters in this crate;
/// the inherent methods of each filter expose the full error reporting.
pub trait StateEstimator {
    /// State type used by this estimator
    type State;
    /// Measurement type used by this estimator
    type Measurement;
    /// Control input type
    type Control;

    /// Prediction step
    fn predict(&mut self, control: &Self::Control, dt: f64);

    /// Update step with measurement
    fn update(&mut self, measurement: &Self::Measurement);

    /// Get current state estimate
    fn get_state(&self) -> &Self::State;
}

/// Receiver for per-step localizer output
pub trait TrajectorySink {
    /// Record one timestamped estimate
    fn emit(&mut self, estimate: &PoseEstimate);
}

impl TrajectorySink for Vec<PoseEstimate> {
    fn emit(&mut self, estimate: &PoseEstimate) {
        self.push(*estimate);
    }
}
