//! RustAutonomy - Rust implementation of autonomy algorithms
//!
//! This crate provides implementations of common autonomy algorithms
//! for localization, state estimation, path planning, path tracking,
//! and control.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod localization;
pub mod estimation;
pub mod path_planning;
pub mod path_tracking;
pub mod control;

// Re-export common types for convenience
pub use common::{Point2D, Point3D, Pose2D, State2D, Path2D, ControlInput, Waypoint, PoseEstimate};
pub use common::{StateEstimator, TrajectorySink};
pub use common::{EstimationError, EstimationResult};
