use glam::Mat4;

use crate::scene::Lights;

/// Lighting configuration shared by the mesh and shadow shaders.
/// NOTE: Must match `parallax::lighting::LightingUniform` exactly (128 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    /// Shadow camera view-projection.
    pub light_view_proj: [[f32; 4]; 4],
    /// Summed ambient color.
    pub ambient: [f32; 3],
    /// Directional light intensity (0 without a directional light).
    pub light_intensity: f32,
    /// Unit vector toward the directional light.
    pub light_dir: [f32; 3],
    /// 1.0 when the shadow map is valid.
    pub shadows_enabled: f32,
    /// Directional light color.
    pub light_color: [f32; 3],
    /// Blinn-Phong specular strength.
    pub specular_intensity: f32,
    /// Blinn-Phong exponent.
    pub shininess: f32,
    /// Depth comparison bias.
    pub shadow_bias: f32,
    /// One shadow map texel in UV units.
    pub shadow_texel: f32,
    /// Padding.
    pub _pad: f32,
}

impl LightingUniform {
    /// Pack the scene lights. `shadows` is the display toggle; the light
    /// must also cast shadows for the map to be used.
    #[must_use]
    pub fn new(lights: &Lights, shadows: bool) -> Self {
        let mut uniform = Self {
            light_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            ambient: lights.ambient_total(),
            light_intensity: 0.0,
            light_dir: [0.0, 1.0, 0.0],
            shadows_enabled: 0.0,
            light_color: [0.0; 3],
            specular_intensity: lights.specular_intensity,
            shininess: lights.shininess.max(1.0),
            shadow_bias: 0.0,
            shadow_texel: 0.0,
            _pad: 0.0,
        };
        if let Some(key) = &lights.directional {
            uniform.light_view_proj = key.shadow_view_proj().to_cols_array_2d();
            uniform.light_intensity = key.intensity;
            uniform.light_dir = key.to_light().to_array();
            uniform.light_color = key.color;
            uniform.shadows_enabled = if shadows && key.cast_shadow {
                1.0
            } else {
                0.0
            };
            uniform.shadow_bias = key.shadow.bias;
            uniform.shadow_texel = 1.0 / key.shadow.map_size as f32;
        }
        uniform
    }

    /// Whether the shadow pass needs to run.
    #[must_use]
    pub fn shadows_enabled(&self) -> bool {
        self.shadows_enabled > 0.5
    }
}
