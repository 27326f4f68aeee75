//! Utility modules for rust_autonomy

pub mod visualization;

pub use visualization::{covariance_ellipse, Visualizer, PathStyle, PointStyle, colors};
