//! Waypoint tracking controller
//!
//! Longitudinal PID on speed paired with a geometric lateral law: heading
//! error to the local path direction plus a crosstrack correction measured
//! at the front axle.
//!
//! Ref:
//! - [Stanley: The robot that won the DARPA grand challenge](http://isl.ecst.csuchico.edu/DOCS/darpa2005/DARPA%202005%20Stanley.pdf)

use std::f64::consts::PI;

use ordered_float::OrderedFloat;

use crate::common::angle::wrap_to_pi;
use crate::common::error::{EstimationError, EstimationResult};
use crate::common::types::{State2D, Waypoint};

/// Actuation command: throttle in [0, 1], steering in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlCommand {
    pub throttle: f64,
    pub steer: f64,
}

impl ControlCommand {
    pub fn neutral() -> Self {
        Self { throttle: 0.0, steer: 0.0 }
    }
}

/// Gains and limits for the waypoint controller
#[derive(Debug, Clone)]
pub struct WaypointControllerConfig {
    /// Speed proportional gain
    pub kp: f64,
    /// Speed integral gain
    pub ki: f64,
    /// Speed derivative gain
    pub kd: f64,
    /// Crosstrack gain of the lateral law
    pub k_crosstrack: f64,
    /// Front axle offset used for the crosstrack error [m]
    pub wheelbase: f64,
    /// Steering limit [rad]
    pub max_steer: f64,
    /// Clamp on the accumulated integral term
    pub integral_limit: f64,
    /// First-order filter coefficient on the desired speed, in (0, 1]
    pub speed_filter: f64,
}

impl Default for WaypointControllerConfig {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.2,
            kd: 0.01,
            k_crosstrack: 0.3,
            wheelbase: 2.9,
            max_steer: 70.0 / 180.0 * PI,
            integral_limit: 10.0,
            speed_filter: 0.1,
        }
    }
}

/// Waypoint follower with PID speed control and geometric steering
pub struct WaypointController {
    config: WaypointControllerConfig,
    waypoints: Vec<Waypoint>,
    integral: f64,
    previous_error: f64,
    filtered_target: f64,
    previous_time: Option<f64>,
}

impl WaypointController {
    pub fn new(
        waypoints: Vec<Waypoint>,
        config: WaypointControllerConfig,
    ) -> EstimationResult<Self> {
        if waypoints.len() < 2 {
            return Err(EstimationError::InvalidParameter(
                "waypoint course needs at least two waypoints".to_string(),
            ));
        }
        if config.max_steer <= 0.0 {
            return Err(EstimationError::InvalidParameter(
                "steering limit must be positive".to_string(),
            ));
        }
        if config.speed_filter <= 0.0 || config.speed_filter > 1.0 {
            return Err(EstimationError::InvalidParameter(
                "speed filter coefficient must lie in (0, 1]".to_string(),
            ));
        }
        Ok(Self {
            config,
            waypoints,
            integral: 0.0,
            previous_error: 0.0,
            filtered_target: 0.0,
            previous_time: None,
        })
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Index of the waypoint nearest the vehicle position
    fn nearest_index(&self, state: &State2D) -> usize {
        (0..self.waypoints.len())
            .min_by_key(|&i| {
                let dx = state.x - self.waypoints[i].x;
                let dy = state.y - self.waypoints[i].y;
                OrderedFloat(dx * dx + dy * dy)
            })
            .unwrap_or(0)
    }

    /// Local path direction at a waypoint index
    fn path_yaw(&self, index: usize) -> f64 {
        let (a, b) = if index + 1 < self.waypoints.len() {
            (index, index + 1)
        } else {
            (index - 1, index)
        };
        let dx = self.waypoints[b].x - self.waypoints[a].x;
        let dy = self.waypoints[b].y - self.waypoints[a].y;
        dy.atan2(dx)
    }

    /// Signed crosstrack error at the front axle, positive to the right
    /// of the path direction.
    fn crosstrack_error(&self, state: &State2D, index: usize) -> f64 {
        let fx = state.x + self.config.wheelbase * state.yaw.cos();
        let fy = state.y + self.config.wheelbase * state.yaw.sin();
        let dx = fx - self.waypoints[index].x;
        let dy = fy - self.waypoints[index].y;
        -(state.yaw + 0.5 * PI).cos() * dx - (state.yaw + 0.5 * PI).sin() * dy
    }

    /// Compute the actuation for the current vehicle state at time `t`.
    ///
    /// The first call only primes the controller history and returns a
    /// neutral command; `t` must strictly increase between calls.
    pub fn control(&mut self, state: &State2D, t: f64) -> EstimationResult<ControlCommand> {
        if !state.x.is_finite()
            || !state.y.is_finite()
            || !state.yaw.is_finite()
            || !state.v.is_finite()
            || !t.is_finite()
        {
            return Err(EstimationError::NonFinite("controller input".to_string()));
        }

        let nearest = self.nearest_index(state);
        let previous_time = match self.previous_time {
            None => {
                self.previous_time = Some(t);
                self.filtered_target = self.waypoints[nearest].speed;
                self.previous_error = self.filtered_target - state.v;
                return Ok(ControlCommand::neutral());
            }
            Some(previous) => previous,
        };
        let dt = t - previous_time;
        if dt <= 0.0 {
            return Err(EstimationError::InvalidParameter(format!(
                "control time must increase, got dt {}",
                dt
            )));
        }
        self.previous_time = Some(t);

        // Longitudinal PID on the filtered target speed
        self.filtered_target +=
            self.config.speed_filter * (self.waypoints[nearest].speed - self.filtered_target);
        let error = self.filtered_target - state.v;
        self.integral = (self.integral + error * dt)
            .clamp(-self.config.integral_limit, self.config.integral_limit);
        let derivative = (error - self.previous_error) / dt;
        self.previous_error = error;
        let throttle = (self.config.kp * error
            + self.config.ki * self.integral
            + self.config.kd * derivative)
            .clamp(0.0, 1.0);

        // Lateral: heading to the path plus crosstrack correction
        let heading_error = wrap_to_pi(self.path_yaw(nearest) - state.yaw);
        let crosstrack = self.crosstrack_error(state, nearest);
        let steer = (heading_error + (self.config.k_crosstrack * crosstrack).atan2(state.v))
            .clamp(-self.config.max_steer, self.config.max_steer);

        Ok(ControlCommand { throttle, steer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_course(speed: f64) -> Vec<Waypoint> {
        (0..=100).map(|i| Waypoint::new(i as f64, 0.0, speed)).collect()
    }

    #[test]
    fn test_first_call_is_neutral() {
        let mut controller =
            WaypointController::new(straight_course(5.0), WaypointControllerConfig::default())
                .unwrap();
        let state = State2D::new(0.0, 0.0, 0.0, 0.0);
        let cmd = controller.control(&state, 0.0).unwrap();
        assert_eq!(cmd, ControlCommand::neutral());
    }

    #[test]
    fn test_steers_toward_path() {
        let mut controller =
            WaypointController::new(straight_course(5.0), WaypointControllerConfig::default())
                .unwrap();

        // Left of the path: expect a right (negative) steering command
        let state = State2D::new(10.0, 1.0, 0.0, 2.0);
        controller.control(&state, 0.0).unwrap();
        let cmd = controller.control(&state, 0.1).unwrap();
        assert!(cmd.steer < 0.0);

        // Right of the path: mirrored response
        let mut controller =
            WaypointController::new(straight_course(5.0), WaypointControllerConfig::default())
                .unwrap();
        let state = State2D::new(10.0, -1.0, 0.0, 2.0);
        controller.control(&state, 0.0).unwrap();
        let cmd = controller.control(&state, 0.1).unwrap();
        assert!(cmd.steer > 0.0);
    }

    #[test]
    fn test_steering_respects_limit() {
        let config = WaypointControllerConfig {
            max_steer: 0.1,
            ..Default::default()
        };
        let mut controller = WaypointController::new(straight_course(5.0), config).unwrap();
        let state = State2D::new(10.0, 8.0, 0.0, 2.0);
        controller.control(&state, 0.0).unwrap();
        let cmd = controller.control(&state, 0.1).unwrap();
        assert!((cmd.steer + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_throttle_stays_in_range() {
        let mut controller =
            WaypointController::new(straight_course(50.0), WaypointControllerConfig::default())
                .unwrap();
        let state = State2D::new(0.0, 0.0, 0.0, 0.0);
        controller.control(&state, 0.0).unwrap();
        let cmd = controller.control(&state, 0.1).unwrap();
        assert!(cmd.throttle >= 0.0 && cmd.throttle <= 1.0);

        // Far above the target speed the throttle clamps at zero
        let fast = State2D::new(0.0, 0.0, 0.0, 100.0);
        let cmd = controller.control(&fast, 0.2).unwrap();
        assert_eq!(cmd.throttle, 0.0);
    }

    #[test]
    fn test_rejects_non_increasing_time() {
        let mut controller =
            WaypointController::new(straight_course(5.0), WaypointControllerConfig::default())
                .unwrap();
        let state = State2D::new(0.0, 0.0, 0.0, 0.0);
        controller.control(&state, 0.0).unwrap();
        controller.control(&state, 0.1).unwrap();
        assert!(controller.control(&state, 0.1).is_err());
        assert!(controller.control(&state, 0.05).is_err());
    }

    #[test]
    fn test_rejects_short_course_and_bad_config() {
        let one = vec![Waypoint::new(0.0, 0.0, 1.0)];
        assert!(WaypointController::new(one, WaypointControllerConfig::default()).is_err());

        let config = WaypointControllerConfig { speed_filter: 0.0, ..Default::default() };
        assert!(WaypointController::new(straight_course(1.0), config).is_err());
    }

    #[test]
    fn test_closed_loop_converges_to_course() {
        let mut controller =
            WaypointController::new(straight_course(5.0), WaypointControllerConfig::default())
                .unwrap();

        // Start offset two meters left of the course, at rest
        let mut state = State2D::new(0.0, 2.0, 0.0, 0.0);
        let dt = 0.05;
        for k in 0..400 {
            let cmd = controller.control(&state, k as f64 * dt).unwrap();
            let accel = 3.0 * cmd.throttle - 0.1 * state.v;
            state.advance_bicycle(accel, cmd.steer, 2.9, dt);
        }

        assert!(state.y.abs() < 0.3);
        assert!(state.yaw.abs() < 0.1);
        assert!((state.v - 5.0).abs() < 0.5);
        assert!(state.x > 50.0);
    }
}
