//! Landmark → camera pose mapping.
//!
//! The eye midpoint drives the camera: moving the head left/right slides
//! the camera along X, moving it up/down slides it along Y, and the
//! distance to the scene stays fixed. The camera always aims at the
//! world origin, which gives the parallax "window" effect.

use glam::{Mat4, Vec3};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::core::Camera;
use crate::tracking::LandmarkSample;

/// Eye position and look-at target for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// World-space eye position.
    pub position: Vec3,
    /// World-space look-at target.
    pub target: Vec3,
}

impl CameraPose {
    /// Write this pose into a live camera.
    pub fn apply(&self, camera: &mut Camera) {
        camera.eye = self.position;
        camera.target = self.target;
    }

    /// View matrix looking from `position` at `target` with +Y up.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

/// Constants of the linear landmark → camera position map.
///
/// With `(mx, my)` the midpoint between the eyes in detector pixels:
///
/// ```text
/// x = (-mx / x_divisor + x_offset) * x_scale
/// y = y_base - my * y_scale
/// z = z
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct LandmarkMapping {
    /// Horizontal pixel span mapped onto one unit before offsetting.
    pub x_divisor: f32,
    /// Offset added after normalising the horizontal coordinate.
    pub x_offset: f32,
    /// World units per normalised horizontal unit.
    pub x_scale: f32,
    /// Camera height when the eyes are at pixel row 0.
    pub y_base: f32,
    /// World units per vertical pixel.
    pub y_scale: f32,
    /// Fixed camera depth.
    pub z: f32,
}

impl Default for LandmarkMapping {
    fn default() -> Self {
        Self {
            x_divisor: 500.0,
            x_offset: 0.5,
            x_scale: 3.0,
            y_base: 3.5,
            y_scale: 0.01,
            z: 2.5,
        }
    }
}

impl LandmarkMapping {
    /// Map a landmark sample to this frame's camera pose.
    ///
    /// Pure: the same sample always yields the same pose. Only the eyes
    /// contribute; the nose is carried in the sample but ignored here.
    #[must_use]
    pub fn pose(&self, sample: &LandmarkSample) -> CameraPose {
        let mid = sample.eye_midpoint();
        let x = (-mid.x / self.x_divisor + self.x_offset) * self.x_scale;
        let y = self.y_base - mid.y * self.y_scale;
        CameraPose {
            position: Vec3::new(x, y, self.z),
            target: Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::options::CameraOptions;

    fn sample(left: (f32, f32), right: (f32, f32), nose: (f32, f32)) -> LandmarkSample {
        LandmarkSample {
            left_eye: Vec2::new(left.0, left.1),
            right_eye: Vec2::new(right.0, right.1),
            nose: Vec2::new(nose.0, nose.1),
        }
    }

    fn assert_close(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).length() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn centered_eyes_at_origin() {
        let pose = LandmarkMapping::default()
            .pose(&sample((0.0, 0.0), (0.0, 0.0), (0.0, 100.0)));
        assert_close(pose.position, Vec3::new(1.5, 3.5, 2.5));
        assert_eq!(pose.target, Vec3::ZERO);
    }

    #[test]
    fn offset_eyes_move_camera() {
        let pose = LandmarkMapping::default()
            .pose(&sample((100.0, 50.0), (200.0, 50.0), (150.0, 150.0)));
        assert_close(pose.position, Vec3::new(0.6, 3.0, 2.5));
    }

    #[test]
    fn mapping_is_idempotent() {
        let mapping = LandmarkMapping::default();
        let s = sample((320.0, 240.0), (380.0, 236.0), (350.0, 290.0));
        assert_eq!(mapping.pose(&s), mapping.pose(&s));
    }

    #[test]
    fn default_sample_gives_deterministic_pose() {
        let mapping = LandmarkMapping::default();
        let first = mapping.pose(&LandmarkSample::default());
        let second = mapping.pose(&LandmarkSample::default());
        assert_close(first.position, Vec3::new(1.5, 3.5, 2.5));
        assert_eq!(first, second);
    }

    #[test]
    fn nose_above_eyes_does_not_affect_position() {
        let mapping = LandmarkMapping::default();
        // nose.y < midpoint y
        let upside_down = sample((0.0, 50.0), (0.0, 50.0), (0.0, 0.0));
        let upright = sample((0.0, 50.0), (0.0, 50.0), (0.0, 120.0));
        let pose = mapping.pose(&upside_down);
        assert!(pose.position.is_finite());
        assert_close(pose.position, Vec3::new(1.5, 3.0, 2.5));
        assert_eq!(pose, mapping.pose(&upright));
    }

    #[test]
    fn apply_overwrites_eye_and_target_only() {
        let mut camera = Camera::from_options(&CameraOptions::default(), 2.0);
        let pose = CameraPose {
            position: Vec3::new(1.0, 2.0, 3.0),
            target: Vec3::ZERO,
        };
        pose.apply(&mut camera);
        assert_eq!(camera.eye, pose.position);
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.aspect, 2.0);
        assert_eq!(camera.build_view(), pose.view_matrix());
    }
}
