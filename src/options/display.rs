use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::HexColor;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Surface, antialiasing and debug-overlay toggles.
pub struct DisplayOptions {
    /// MSAA sample count for the main pass (1 disables antialiasing).
    #[schemars(title = "MSAA Samples", range(min = 1, max = 4))]
    pub msaa_samples: u32,
    /// Background clear color.
    #[schemars(title = "Background", with = "String")]
    pub clear_color: HexColor,
    /// Render the directional light's shadow map.
    #[schemars(title = "Shadows")]
    pub shadows: bool,
    /// Draw the directional light helper gizmo.
    #[schemars(title = "Light Helper")]
    pub show_light_helper: bool,
    /// Frame cap (0 = unlimited, paced by vsync).
    #[schemars(skip)]
    pub target_fps: u32,
}

impl DisplayOptions {
    /// Sample count clamped to what the pipelines are built for (1 or 4).
    #[must_use]
    pub fn sample_count(&self) -> u32 {
        if self.msaa_samples >= 4 {
            4
        } else {
            1
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            msaa_samples: 4,
            clear_color: HexColor::new(0x000000),
            shadows: true,
            show_light_helper: true,
            target_fps: 0,
        }
    }
}
