// Path Tracking algorithms module

pub mod pure_pursuit;
pub mod waypoint_controller;

// Re-exports
pub use pure_pursuit::{
    crosstrack_decay, crosstrack_decay_rk4, curvature, steering_angle, turning_radius,
};
pub use waypoint_controller::{ControlCommand, WaypointController, WaypointControllerConfig};
