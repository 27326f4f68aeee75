// Localization algorithms module

pub mod landmark_ekf;
pub mod linear_kf;

// Re-exports
pub use landmark_ekf::{
    expected_observation, motion_jacobians, motion_model, observation_jacobian, LandmarkEkf,
    LandmarkEkfConfig, LandmarkMap, LandmarkObservation, PoseState, StepRecord, UpdateOutcome,
};
pub use linear_kf::{LinearKf, LinearKfConfig};
