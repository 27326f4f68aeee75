//! Figure-eight steering schedule
//!
//! Open-loop inputs that drive a kinematic bicycle through a figure eight:
//! constant forward speed and a three-piece steering schedule that switches
//! sign at 1/8 and 5/8 of the samples.

use std::f64::consts::PI;

use crate::common::error::{EstimationError, EstimationResult};
use crate::common::types::{Point2D, State2D};

/// Parameters of a figure-eight run
#[derive(Debug, Clone)]
pub struct FigureEightPlan {
    /// Circle radius [m]
    pub radius: f64,
    /// Bicycle wheelbase [m]
    pub wheelbase: f64,
    /// Total duration [s]
    pub duration: f64,
    /// Sample period [s]
    pub dt: f64,
}

impl FigureEightPlan {
    pub fn new(radius: f64, wheelbase: f64, duration: f64, dt: f64) -> EstimationResult<Self> {
        if radius <= 0.0 || wheelbase <= 0.0 || duration <= 0.0 || dt <= 0.0 {
            return Err(EstimationError::InvalidParameter(
                "figure eight parameters must be positive".to_string(),
            ));
        }
        Ok(Self { radius, wheelbase, duration, dt })
    }

    /// Forward speed that closes both circles within the duration
    pub fn speed(&self) -> f64 {
        4.0 * PI * self.radius / self.duration
    }

    /// Number of control samples
    pub fn samples(&self) -> usize {
        (self.duration / self.dt).round() as usize
    }

    /// Per-sample steering angles: positive over the first eighth and the
    /// final three eighths, negative over the middle half.
    pub fn steering_schedule(&self) -> Vec<f64> {
        let n = self.samples();
        let steer = (self.wheelbase / self.radius).atan();
        let first_switch = n / 8;
        let second_switch = 5 * n / 8;
        (0..n)
            .map(|k| {
                if k < first_switch || k >= second_switch {
                    steer
                } else {
                    -steer
                }
            })
            .collect()
    }

    /// Per-sample center of the circle being traced, as an offset from
    /// the start pose. The left circle sits at (0, r), the right circle
    /// at (2r, r).
    pub fn center_offsets(&self) -> Vec<Point2D> {
        let n = self.samples();
        let first_switch = n / 8;
        let second_switch = 5 * n / 8;
        (0..n)
            .map(|k| {
                if k >= first_switch && k < second_switch {
                    Point2D::new(2.0 * self.radius, self.radius)
                } else {
                    Point2D::new(0.0, self.radius)
                }
            })
            .collect()
    }

    /// Roll the schedule through a kinematic bicycle starting at the origin,
    /// returning the pose track (samples + 1 states).
    pub fn rollout(&self) -> Vec<State2D> {
        let mut state = State2D::new(0.0, 0.0, 0.0, self.speed());
        let mut track = vec![state];
        let schedule = self.steering_schedule();
        for &steer in &schedule {
            state.advance_bicycle(0.0, steer, self.wheelbase, self.dt);
            track.push(state);
        }
        track
    }
}
