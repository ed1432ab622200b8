//! Centralized scene/display options with TOML preset support.
//!
//! Everything the demo variants differ in (camera placement, lights,
//! ground planes, model transform, head tracking) is consolidated here.
//! Options serialize to/from TOML for the presets stored in
//! `assets/presets/`.

mod camera;
mod color;
mod display;
mod ground;
mod lighting;
mod model;
mod tracking;

use std::path::Path;

pub use camera::CameraOptions;
pub use color::HexColor;
pub use display::DisplayOptions;
pub use ground::GroundOptions;
pub use lighting::{
    AmbientLightOptions, DirectionalLightOptions, LightingOptions,
};
pub use model::ModelOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use tracking::{DetectorSource, TrackingMode, TrackingOptions};

use crate::error::ParallaxError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[tracking]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Surface and overlay toggles.
    pub display: DisplayOptions,
    /// Camera projection and initial placement.
    pub camera: CameraOptions,
    /// Ambient and directional lights.
    pub lighting: LightingOptions,
    /// Static ground planes.
    pub ground: GroundOptions,
    /// The loaded model and its transform.
    pub model: ModelOptions,
    /// Head-tracking mode, detector source and mapping.
    pub tracking: TrackingOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Io`] if the file cannot be read and
    /// [`ParallaxError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, ParallaxError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::OptionsParse`] on malformed input.
    pub fn from_toml(content: &str) -> Result<Self, ParallaxError> {
        toml::from_str(content)
            .map_err(|e| ParallaxError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError`] if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ParallaxError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ParallaxError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(ParallaxError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
