use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::HexColor;

/// A uniform ambient term. Several may be stacked; they add up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AmbientLightOptions {
    /// Light color.
    #[schemars(with = "String")]
    pub color: HexColor,
    /// Intensity multiplier.
    #[schemars(range(min = 0.0, max = 2.0))]
    pub intensity: f32,
}

/// The key light: a directional light pointing from `position` to
/// `target`, optionally casting shadows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct DirectionalLightOptions {
    /// Light color.
    #[schemars(with = "String")]
    pub color: HexColor,
    /// Intensity multiplier.
    #[schemars(title = "Key Light", range(min = 0.0, max = 3.0), extend("step" = 0.05))]
    pub intensity: f32,
    /// Light position; the direction is `target - position`.
    pub position: [f32; 3],
    /// Point the light aims at.
    #[schemars(skip)]
    pub target: [f32; 3],
    /// Whether the light renders a shadow map.
    pub cast_shadow: bool,
    /// Shadow map resolution (square).
    #[schemars(skip)]
    pub shadow_map_size: u32,
    /// Half-extent of the orthographic shadow frustum.
    #[schemars(skip)]
    pub shadow_extent: f32,
    /// Shadow camera near plane.
    #[schemars(skip)]
    pub shadow_near: f32,
    /// Shadow camera far plane.
    #[schemars(skip)]
    pub shadow_far: f32,
    /// Depth bias applied when comparing against the shadow map.
    #[schemars(skip)]
    pub shadow_bias: f32,
}

impl Default for DirectionalLightOptions {
    fn default() -> Self {
        Self {
            color: HexColor::WHITE,
            intensity: 0.8,
            position: [2.0, 2.0, 1.0],
            target: [0.0, 0.0, 0.0],
            cast_shadow: true,
            shadow_map_size: 2048,
            shadow_extent: 5.0,
            shadow_near: 0.5,
            shadow_far: 500.0,
            shadow_bias: 0.002,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Scene light set.
pub struct LightingOptions {
    /// Ambient terms, summed.
    pub ambient: Vec<AmbientLightOptions>,
    /// The shadow-casting key light.
    pub directional: DirectionalLightOptions,
    /// Blinn-Phong specular strength.
    #[schemars(skip)]
    pub specular_intensity: f32,
    /// Blinn-Phong exponent.
    #[schemars(skip)]
    pub shininess: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient: vec![
                AmbientLightOptions {
                    color: HexColor::new(0x404040),
                    intensity: 1.0,
                },
                AmbientLightOptions {
                    color: HexColor::WHITE,
                    intensity: 0.5,
                },
            ],
            directional: DirectionalLightOptions::default(),
            specular_intensity: 0.2,
            shininess: 30.0,
        }
    }
}
