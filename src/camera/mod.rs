//! Camera system for 3D scene viewing.
//!
//! A perspective camera plus the landmark-driven pose mapping used by the
//! head-tracked mode.

/// Core camera struct and GPU uniform types.
pub mod core;
/// Landmark sample → camera pose mapping.
pub mod pose;

pub use self::core::{Camera, CameraUniform};
pub use self::pose::{CameraPose, LandmarkMapping};
