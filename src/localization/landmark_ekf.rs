//! Landmark-based EKF localization
//!
//! Fuses wheel odometry (forward speed and yaw rate) with range/bearing
//! observations of known landmarks into a planar pose estimate with
//! covariance. Observations arrive pre-associated with a landmark id and
//! are applied sequentially within a time step.
//!
//! Reference:
//! - Probabilistic Robotics (Thrun, Burgard, Fox)

use nalgebra::{Cholesky, Matrix2, Matrix2x3, Matrix3, Matrix3x2, Vector2, Vector3};

use crate::common::angle::wrap_to_pi;
use crate::common::error::{EstimationError, EstimationResult};
use crate::common::traits::{StateEstimator, TrajectorySink};
use crate::common::types::{ControlInput, Point2D, PoseEstimate};

/// Pose state for the landmark EKF (x, y, yaw)
pub type PoseState = Vector3<f64>;

/// Table of known landmark positions, indexed by id
#[derive(Debug, Clone)]
pub struct LandmarkMap {
    positions: Vec<Point2D>,
}

impl LandmarkMap {
    pub fn from_points(positions: Vec<Point2D>) -> Self {
        Self { positions }
    }

    pub fn from_xy(x: &[f64], y: &[f64]) -> Self {
        assert_eq!(x.len(), y.len());
        let positions = x.iter().zip(y.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        Self { positions }
    }

    pub fn get(&self, id: usize) -> Option<Point2D> {
        self.positions.get(id).copied()
    }

    pub fn positions(&self) -> &[Point2D] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Range/bearing observation of a known landmark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkObservation {
    pub id: usize,
    pub range: f64,
    pub bearing: f64,
}

impl LandmarkObservation {
    /// The bearing is wrapped to (-pi, pi] on construction.
    pub fn new(id: usize, range: f64, bearing: f64) -> Self {
        Self { id, range, bearing: wrap_to_pi(bearing) }
    }
}

/// One timestamped input record: odometry plus landmark observations
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub t: f64,
    pub control: ControlInput,
    pub observations: Vec<LandmarkObservation>,
}

impl StepRecord {
    pub fn new(t: f64, control: ControlInput, observations: Vec<LandmarkObservation>) -> Self {
        Self { t, control, observations }
    }
}

/// Configuration for the landmark EKF
#[derive(Debug, Clone)]
pub struct LandmarkEkfConfig {
    /// Process noise covariance on (v, omega)
    pub q: Matrix2<f64>,
    /// Measurement noise covariance on (range, bearing)
    pub r: Matrix2<f64>,
    /// Predicted range below which a landmark update is skipped
    pub range_epsilon: f64,
    /// Condition number of S above which a landmark update is skipped
    pub condition_limit: f64,
    /// Re-symmetrize the covariance after every predict/correct
    pub symmetrize: bool,
    /// Wrap the bearing innovation before applying the gain
    pub wrap_innovation: bool,
    /// Allowed negative slack on covariance eigenvalues
    pub psd_tolerance: f64,
}

impl Default for LandmarkEkfConfig {
    fn default() -> Self {
        Self {
            q: Matrix2::from_diagonal(&Vector2::new(0.01, 0.01)),
            r: Matrix2::from_diagonal(&Vector2::new(0.01, 0.01)),
            range_epsilon: 1e-6,
            condition_limit: 1e12,
            symmetrize: true,
            wrap_innovation: true,
            psd_tolerance: 1e-9,
        }
    }
}

/// Result of a single landmark update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    /// Update applied normally
    Applied,
    /// Landmark nearly coincident with the predicted position, update skipped
    SkippedDegenerate { predicted_range: f64 },
    /// Innovation covariance singular or ill-conditioned, update skipped
    SkippedIllConditioned { condition: f64 },
}

/// Unicycle motion model x_k = f(x_{k-1}, u_k, dt)
pub fn motion_model(x: &PoseState, u: &ControlInput, dt: f64) -> PoseState {
    Vector3::new(
        x[0] + dt * u.v * x[2].cos(),
        x[1] + dt * u.v * x[2].sin(),
        wrap_to_pi(x[2] + dt * u.omega),
    )
}

/// Jacobians of the motion model with respect to the state (F) and to the
/// control noise (L), evaluated at the prior state.
pub fn motion_jacobians(x: &PoseState, v: f64, dt: f64) -> (Matrix3<f64>, Matrix3x2<f64>) {
    let yaw = x[2];
    let f = Matrix3::new(
        1.0, 0.0, -dt * v * yaw.sin(),
        0.0, 1.0, dt * v * yaw.cos(),
        0.0, 0.0, 1.0,
    );
    let l = Matrix3x2::new(
        dt * yaw.cos(), 0.0,
        dt * yaw.sin(), 0.0,
        0.0, dt,
    );
    (f, l)
}

/// Expected range/bearing observation of a landmark from a pose
pub fn expected_observation(x: &PoseState, landmark: &Point2D) -> Vector2<f64> {
    let dx = landmark.x - x[0];
    let dy = landmark.y - x[1];
    let d = (dx * dx + dy * dy).sqrt();
    let angle = wrap_to_pi(dy.atan2(dx) - x[2]);
    Vector2::new(d, angle)
}

/// Jacobian of the observation model with respect to the pose
pub fn observation_jacobian(x: &PoseState, landmark: &Point2D) -> Matrix2x3<f64> {
    let dx = landmark.x - x[0];
    let dy = landmark.y - x[1];
    let d2 = dx * dx + dy * dy;
    let d = d2.sqrt();
    Matrix2x3::new(
        -dx / d, -dy / d, 0.0,
        dy / d2, -dx / d2, -1.0,
    )
}

/// Landmark-based EKF localizer
#[derive(Debug)]
pub struct LandmarkEkf {
    /// Current pose estimate [x, y, yaw]
    state: PoseState,
    /// State covariance matrix
    covariance: Matrix3<f64>,
    /// Known landmark positions
    landmarks: LandmarkMap,
    /// Configuration
    config: LandmarkEkfConfig,
    /// Timestamp of the last completed step
    last_time: Option<f64>,
    /// Index of the record currently being processed
    step_index: usize,
    /// Output of the last completed step
    last_estimate: Option<PoseEstimate>,
    /// Fatal error that stopped the filter, if any
    halted: Option<EstimationError>,
}

impl LandmarkEkf {
    /// Create a new localizer from an initial mean and covariance.
    ///
    /// The initial covariance is symmetrized and must be positive
    /// semi-definite within the configured tolerance.
    pub fn new(
        initial_pose: PoseState,
        initial_covariance: Matrix3<f64>,
        landmarks: LandmarkMap,
        config: LandmarkEkfConfig,
    ) -> EstimationResult<Self> {
        let covariance =
            Self::validate_initial(&initial_pose, &initial_covariance, config.psd_tolerance)?;
        let mut state = initial_pose;
        state[2] = wrap_to_pi(state[2]);
        Ok(LandmarkEkf {
            state,
            covariance,
            landmarks,
            config,
            last_time: None,
            step_index: 0,
            last_estimate: None,
            halted: None,
        })
    }

    /// Create with default configuration
    pub fn with_defaults(
        initial_pose: PoseState,
        initial_covariance: Matrix3<f64>,
        landmarks: LandmarkMap,
    ) -> EstimationResult<Self> {
        Self::new(initial_pose, initial_covariance, landmarks, LandmarkEkfConfig::default())
    }

    fn validate_initial(
        pose: &PoseState,
        covariance: &Matrix3<f64>,
        psd_tolerance: f64,
    ) -> EstimationResult<Matrix3<f64>> {
        if !pose.iter().all(|v| v.is_finite()) {
            return Err(EstimationError::NonFinite("initial pose".to_string()));
        }
        if !covariance.iter().all(|v| v.is_finite()) {
            return Err(EstimationError::NonFinite("initial covariance".to_string()));
        }
        let sym = (covariance + covariance.transpose()) * 0.5;
        let min_eigenvalue = sym.symmetric_eigenvalues().min();
        if min_eigenvalue < -psd_tolerance {
            return Err(EstimationError::CovarianceNotPsd { step: 0, min_eigenvalue });
        }
        Ok(sym)
    }

    /// Get reference to the current pose estimate
    pub fn get_pose(&self) -> &PoseState {
        &self.state
    }

    /// Get reference to the state covariance
    pub fn get_covariance_matrix(&self) -> &Matrix3<f64> {
        &self.covariance
    }

    /// Get the landmark table
    pub fn get_landmarks(&self) -> &LandmarkMap {
        &self.landmarks
    }

    /// Output of the last completed step, if any
    pub fn get_last_estimate(&self) -> Option<&PoseEstimate> {
        self.last_estimate.as_ref()
    }

    /// Whether a fatal error stopped the filter
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    fn ensure_running(&self) -> EstimationResult<()> {
        match &self.halted {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn halt(&mut self, err: EstimationError) -> EstimationError {
        eprintln!("landmark ekf halted: {}", err);
        self.halted = Some(err.clone());
        err
    }

    fn check_health(&mut self) -> EstimationResult<()> {
        if !self.state.iter().all(|v| v.is_finite())
            || !self.covariance.iter().all(|v| v.is_finite())
        {
            let step = self.step_index;
            return Err(self.halt(EstimationError::NonFinite(format!(
                "state or covariance at step {}",
                step
            ))));
        }
        let min_eigenvalue = self.covariance.symmetric_eigenvalues().min();
        if min_eigenvalue < -self.config.psd_tolerance {
            let step = self.step_index;
            return Err(self.halt(EstimationError::CovarianceNotPsd { step, min_eigenvalue }));
        }
        Ok(())
    }

    /// Prediction step: propagate the mean through the motion model and
    /// the covariance through F P F^T + L Q L^T.
    ///
    /// `dt = 0` leaves both the mean and the covariance untouched.
    pub fn predict(&mut self, control: &ControlInput, dt: f64) -> EstimationResult<()> {
        self.ensure_running()?;
        if !control.v.is_finite() || !control.omega.is_finite() || !dt.is_finite() {
            let step = self.step_index;
            return Err(self.halt(EstimationError::NonFinite(format!(
                "control input at step {}",
                step
            ))));
        }
        if dt < 0.0 {
            return Err(self.halt(EstimationError::InvalidParameter(format!(
                "negative dt {} in predict",
                dt
            ))));
        }
        if dt == 0.0 {
            return Ok(());
        }

        // Jacobians at the prior state, before the mean moves
        let (f, l) = motion_jacobians(&self.state, control.v, dt);
        self.state = motion_model(&self.state, control, dt);
        self.covariance =
            f * self.covariance * f.transpose() + l * self.config.q * l.transpose();
        if self.config.symmetrize {
            self.covariance = (self.covariance + self.covariance.transpose()) * 0.5;
        }
        self.check_health()
    }

    /// Correction step for a single landmark observation.
    ///
    /// Returns the outcome: applied, or skipped because of degenerate
    /// geometry or an ill-conditioned innovation covariance. Skips leave
    /// the state untouched and the filter running.
    pub fn correct(&mut self, observation: &LandmarkObservation) -> EstimationResult<UpdateOutcome> {
        self.ensure_running()?;
        if !observation.range.is_finite() || !observation.bearing.is_finite() {
            let step = self.step_index;
            return Err(self.halt(EstimationError::NonFinite(format!(
                "observation of landmark {} at step {}",
                observation.id, step
            ))));
        }
        let landmark = match self.landmarks.get(observation.id) {
            Some(p) => p,
            None => {
                let step = self.step_index;
                return Err(self.halt(EstimationError::UnknownLandmark {
                    step,
                    id: observation.id,
                }));
            }
        };

        let z_pred = expected_observation(&self.state, &landmark);
        if z_pred[0] < self.config.range_epsilon {
            eprintln!(
                "step {}: landmark {} at predicted range {:.3e}, update skipped",
                self.step_index, observation.id, z_pred[0]
            );
            return Ok(UpdateOutcome::SkippedDegenerate { predicted_range: z_pred[0] });
        }

        let bearing = wrap_to_pi(observation.bearing);
        let y = if self.config.wrap_innovation {
            Vector2::new(observation.range - z_pred[0], wrap_to_pi(bearing - z_pred[1]))
        } else {
            Vector2::new(observation.range - z_pred[0], bearing - z_pred[1])
        };

        let h = observation_jacobian(&self.state, &landmark);
        let s = h * self.covariance * h.transpose() + self.config.r;
        let eigenvalues = s.symmetric_eigenvalues();
        let (min_eig, max_eig) = (eigenvalues.min(), eigenvalues.max());
        let condition = if min_eig > 0.0 { max_eig / min_eig } else { f64::INFINITY };
        if min_eig <= 0.0 || condition > self.config.condition_limit {
            eprintln!(
                "step {}: landmark {} innovation condition {:.3e}, update skipped",
                self.step_index, observation.id, condition
            );
            return Ok(UpdateOutcome::SkippedIllConditioned { condition });
        }

        // Gain from the Cholesky solve of S K^T = H P, never an explicit inverse
        let k = match Cholesky::new(s) {
            Some(chol) => chol.solve(&(h * self.covariance)).transpose(),
            None => {
                eprintln!(
                    "step {}: landmark {} innovation factorization failed, update skipped",
                    self.step_index, observation.id
                );
                return Ok(UpdateOutcome::SkippedIllConditioned { condition });
            }
        };

        self.state += k * y;
        self.state[2] = wrap_to_pi(self.state[2]);
        self.covariance = (Matrix3::identity() - k * h) * self.covariance;
        if self.config.symmetrize {
            self.covariance = (self.covariance + self.covariance.transpose()) * 0.5;
        }
        self.check_health()?;
        Ok(UpdateOutcome::Applied)
    }

    /// Process one timestamped record: predict with its control, then apply
    /// each landmark observation in record order.
    ///
    /// The first record uses `dt = 0`; afterwards `dt` is the difference to
    /// the previous timestamp, which must be monotone non-decreasing.
    pub fn step(&mut self, record: &StepRecord) -> EstimationResult<PoseEstimate> {
        self.ensure_running()?;
        if !record.t.is_finite() {
            let step = self.step_index;
            return Err(self.halt(EstimationError::NonFinite(format!(
                "timestamp at step {}",
                step
            ))));
        }
        let dt = match self.last_time {
            Some(previous) => {
                if record.t < previous {
                    let step = self.step_index;
                    return Err(self.halt(EstimationError::OutOfOrderTimestamp {
                        step,
                        previous,
                        current: record.t,
                    }));
                }
                record.t - previous
            }
            None => 0.0,
        };
        self.predict(&record.control, dt)?;
        for observation in &record.observations {
            self.correct(observation)?;
        }
        self.last_time = Some(record.t);
        let estimate = PoseEstimate::new(record.t, self.state, self.covariance);
        self.last_estimate = Some(estimate);
        self.step_index += 1;
        Ok(estimate)
    }

    /// Drive the filter over a record sequence, emitting every estimate.
    pub fn run<S: TrajectorySink>(
        &mut self,
        records: &[StepRecord],
        sink: &mut S,
    ) -> EstimationResult<()> {
        for record in records {
            let estimate = self.step(record)?;
            sink.emit(&estimate);
        }
        Ok(())
    }

    /// Clear a fatal condition and restart from a fresh mean and covariance.
    pub fn reset(
        &mut self,
        initial_pose: PoseState,
        initial_covariance: Matrix3<f64>,
    ) -> EstimationResult<()> {
        let covariance =
            Self::validate_initial(&initial_pose, &initial_covariance, self.config.psd_tolerance)?;
        self.state = initial_pose;
        self.state[2] = wrap_to_pi(self.state[2]);
        self.covariance = covariance;
        self.last_time = None;
        self.step_index = 0;
        self.last_estimate = None;
        self.halted = None;
        Ok(())
    }
}

impl StateEstimator for LandmarkEkf {
    type State = PoseState;
    type Measurement = LandmarkObservation;
    type Control = ControlInput;

    fn predict(&mut self, control: &Self::Control, dt: f64) {
        if let Err(e) = LandmarkEkf::predict(self, control, dt) {
            eprintln!("predict failed: {}", e);
        }
    }

    fn update(&mut self, measurement: &Self::Measurement) {
        if let Err(e) = LandmarkEkf::correct(self, measurement) {
            eprintln!("update failed: {}", e);
        }
    }

    fn get_state(&self) -> &Self::State {
        &self.state
    }
}
