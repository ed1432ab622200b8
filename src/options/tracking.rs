use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::camera::pose::LandmarkMapping;

/// Whether the camera follows the viewer's head.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    /// Camera stays at its configured eye position.
    #[default]
    Static,
    /// Camera position is derived from landmarks every frame.
    HeadTracked,
}

/// Where pose detections come from. Each source yields JSON lines, one
/// array of detections per line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectorSource {
    /// No detector; the sample stays at its default.
    #[default]
    None,
    /// Read detections from this process's stdin.
    Stdin,
    /// Replay a recorded detection log.
    File {
        /// Path to the JSON-lines file.
        path: PathBuf,
        /// Delay between replayed batches, in milliseconds.
        #[serde(default = "default_replay_interval")]
        interval_ms: u64,
    },
    /// Spawn a detector program and read its stdout.
    Command {
        /// Executable to run.
        program: String,
        /// Arguments passed to the program.
        #[serde(default)]
        args: Vec<String>,
    },
}

/// Roughly one webcam frame at 30 fps.
const fn default_replay_interval() -> u64 {
    33
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[schemars(title = "Tracking", inline)]
#[serde(default)]
/// Head-tracking configuration.
pub struct TrackingOptions {
    /// Static or head-tracked camera.
    pub mode: TrackingMode,
    /// Detection source.
    #[schemars(skip)]
    pub source: DetectorSource,
    /// Landmark → camera position constants.
    pub mapping: LandmarkMapping,
}
