// Batch estimation exercises module

pub mod least_squares;
pub mod plane_fitting;
pub mod statistics;

// Re-exports
pub use least_squares::{fit, fit_line, fit_resistance};
pub use plane_fitting::{fit_plane, spherical_to_cartesian};
pub use statistics::{column_means, sample_covariance};
