use glam::{Mat4, Vec3};

use crate::options::{DirectionalLightOptions, LightingOptions};

/// A uniform ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Intensity multiplier.
    pub intensity: f32,
}

/// Shadow map parameters of a directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    /// Square shadow map resolution.
    pub map_size: u32,
    /// Half-extent of the orthographic shadow frustum.
    pub extent: f32,
    /// Near plane.
    pub near: f32,
    /// Far plane.
    pub far: f32,
    /// Depth comparison bias.
    pub bias: f32,
}

/// A directional light shining from `position` toward `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Intensity multiplier.
    pub intensity: f32,
    /// Light position (also the shadow camera's eye).
    pub position: Vec3,
    /// Aim point.
    pub target: Vec3,
    /// Whether a shadow map is rendered for this light.
    pub cast_shadow: bool,
    /// Shadow map parameters.
    pub shadow: ShadowSettings,
}

impl DirectionalLight {
    /// Build from options, converting the color to linear.
    #[must_use]
    pub fn from_options(options: &DirectionalLightOptions) -> Self {
        Self {
            color: options.color.to_linear(),
            intensity: options.intensity,
            position: Vec3::from_array(options.position),
            target: Vec3::from_array(options.target),
            cast_shadow: options.cast_shadow,
            shadow: ShadowSettings {
                map_size: options.shadow_map_size.max(1),
                extent: options.shadow_extent,
                near: options.shadow_near,
                far: options.shadow_far,
                bias: options.shadow_bias,
            },
        }
    }

    /// Unit vector from the surface toward the light.
    #[must_use]
    pub fn to_light(&self) -> Vec3 {
        (self.position - self.target).try_normalize().unwrap_or(Vec3::Y)
    }

    /// Up vector for the light's view, avoiding a degenerate basis when
    /// the light points straight up or down.
    fn view_up(&self) -> Vec3 {
        if self.to_light().cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        }
    }

    /// View-projection of the orthographic shadow camera.
    #[must_use]
    pub fn shadow_view_proj(&self) -> Mat4 {
        let e = self.shadow.extent;
        let view = Mat4::look_at_rh(self.position, self.target, self.view_up());
        let proj = Mat4::orthographic_rh(
            -e,
            e,
            -e,
            e,
            self.shadow.near,
            self.shadow.far,
        );
        proj * view
    }

    /// Gizmo line segments: a `size` × `size` square at the light facing
    /// its target, plus a line from the light to the target.
    #[must_use]
    pub fn helper_lines(&self, size: f32) -> Vec<[Vec3; 2]> {
        let forward = -self.to_light();
        let right = forward.cross(self.view_up()).normalize() * size;
        let up = right.cross(forward).normalize() * size;
        let p = self.position;
        let corners = [p - right + up, p + right + up, p + right - up, p - right - up];
        let mut lines: Vec<[Vec3; 2]> = (0..4)
            .map(|i| [corners[i], corners[(i + 1) % 4]])
            .collect();
        lines.push([p, self.target]);
        lines
    }
}

/// The scene's light set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lights {
    /// Ambient terms (summed).
    pub ambient: Vec<AmbientLight>,
    /// The key light, if any.
    pub directional: Option<DirectionalLight>,
    /// Blinn-Phong specular strength.
    pub specular_intensity: f32,
    /// Blinn-Phong exponent.
    pub shininess: f32,
}

impl Lights {
    /// Build from options.
    #[must_use]
    pub fn from_options(options: &LightingOptions) -> Self {
        Self {
            ambient: options
                .ambient
                .iter()
                .map(|a| AmbientLight {
                    color: a.color.to_linear(),
                    intensity: a.intensity,
                })
                .collect(),
            directional: Some(DirectionalLight::from_options(
                &options.directional,
            )),
            specular_intensity: options.specular_intensity,
            shininess: options.shininess,
        }
    }

    /// Sum of all ambient terms, linear RGB.
    #[must_use]
    pub fn ambient_total(&self) -> [f32; 3] {
        self.ambient.iter().fold([0.0; 3], |acc, a| {
            [
                acc[0] + a.color[0] * a.intensity,
                acc[1] + a.color[1] * a.intensity,
                acc[2] + a.color[2] * a.intensity,
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::HexColor;

    fn key_light() -> DirectionalLight {
        DirectionalLight::from_options(&DirectionalLightOptions::default())
    }

    #[test]
    fn ambient_terms_add_up() {
        let lights = Lights::from_options(&LightingOptions::default());
        let total = lights.ambient_total();
        let grey = HexColor::new(0x404040).to_linear()[0];
        for c in total {
            assert!((c - (grey + 0.5)).abs() < 1e-5);
        }
    }

    #[test]
    fn light_direction_points_at_light() {
        let light = key_light();
        let expected = Vec3::new(2.0, 2.0, 1.0).normalize();
        assert!((light.to_light() - expected).length() < 1e-6);
    }

    #[test]
    fn origin_lands_inside_shadow_frustum() {
        let clip = key_light().shadow_view_proj() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn vertical_light_still_has_a_valid_frustum() {
        let mut light = key_light();
        light.position = Vec3::new(0.0, 5.0, 0.0);
        assert!(light.shadow_view_proj().is_finite());
        for [a, b] in light.helper_lines(1.0) {
            assert!(a.is_finite() && b.is_finite());
        }
    }

    #[test]
    fn helper_is_a_square_plus_target_line() {
        let light = key_light();
        let lines = light.helper_lines(1.0);
        assert_eq!(lines.len(), 5);
        for [a, b] in &lines[..4] {
            assert!(((*b - *a).length() - 2.0).abs() < 1e-5);
            // Square lies in the plane through the light, facing the target
            assert!((*a - light.position).dot(light.to_light()).abs() < 1e-5);
        }
        assert_eq!(lines[4], [light.position, light.target]);
    }
}
