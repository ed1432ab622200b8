use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The latest facial landmarks in detector pixel space.
///
/// Always replaced as a whole; all three points default to the origin
/// before the first detection arrives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LandmarkSample {
    /// Left eye position.
    pub left_eye: Vec2,
    /// Right eye position.
    pub right_eye: Vec2,
    /// Nose tip position.
    pub nose: Vec2,
}

impl LandmarkSample {
    /// Midpoint between the two eyes.
    #[must_use]
    pub fn eye_midpoint(&self) -> Vec2 {
        (self.left_eye + self.right_eye) * 0.5
    }
}

/// One named keypoint as emitted by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Horizontal pixel coordinate.
    pub x: f32,
    /// Vertical pixel coordinate.
    pub y: f32,
    /// Detector confidence, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Keypoint {
    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// The keypoints of one detected pose that head tracking cares about.
/// Other keypoints in the detector output are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseKeypoints {
    /// Left eye.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_eye: Option<Keypoint>,
    /// Right eye.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_eye: Option<Keypoint>,
    /// Nose tip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nose: Option<Keypoint>,
}

/// One pose from a detection batch.
///
/// Wire form (one element of the JSON array on each detector line):
///
/// ```json
/// {"score": 0.93, "pose": {"leftEye": {"x": 310.0, "y": 212.0},
///                          "rightEye": {"x": 262.0, "y": 214.0},
///                          "nose": {"x": 288.0, "y": 250.0}}}
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseDetection {
    /// Overall pose score, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Named keypoints.
    pub pose: PoseKeypoints,
}

impl PoseDetection {
    /// The landmark sample carried by this detection, or `None` when any
    /// of the three required keypoints is missing.
    #[must_use]
    pub fn landmarks(&self) -> Option<LandmarkSample> {
        let pose = &self.pose;
        Some(LandmarkSample {
            left_eye: pose.left_eye.as_ref()?.position(),
            right_eye: pose.right_eye.as_ref()?.position(),
            nose: pose.nose.as_ref()?.position(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sample_is_origin() {
        let sample = LandmarkSample::default();
        assert_eq!(sample.left_eye, Vec2::ZERO);
        assert_eq!(sample.right_eye, Vec2::ZERO);
        assert_eq!(sample.nose, Vec2::ZERO);
        assert_eq!(sample.eye_midpoint(), Vec2::ZERO);
    }

    #[test]
    fn parses_detector_json_and_ignores_extra_keypoints() {
        let json = r#"{
            "score": 0.8,
            "pose": {
                "leftEye": {"x": 100.0, "y": 50.0, "confidence": 0.99},
                "rightEye": {"x": 200.0, "y": 50.0},
                "nose": {"x": 150.0, "y": 150.0},
                "leftEar": {"x": 80.0, "y": 60.0}
            },
            "skeleton": []
        }"#;
        let detection: PoseDetection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.score, Some(0.8));
        let sample = detection.landmarks().unwrap();
        assert_eq!(sample.eye_midpoint(), Vec2::new(150.0, 50.0));
        assert_eq!(sample.nose, Vec2::new(150.0, 150.0));
    }

    #[test]
    fn missing_keypoint_yields_no_sample() {
        let json = r#"{"pose": {"leftEye": {"x": 1.0, "y": 2.0},
                                "nose": {"x": 3.0, "y": 4.0}}}"#;
        let detection: PoseDetection = serde_json::from_str(json).unwrap();
        assert!(detection.landmarks().is_none());
    }
}
