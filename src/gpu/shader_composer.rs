use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, ComposerError, NagaModuleDescriptor,
    ShaderLanguage, ShaderType,
};

use super::render_context::RenderContextError;

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Shared WGSL modules are registered at construction time; consuming
/// shaders pull them in with `#import parallax::module_name::item`.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module sources, in dependency order.
const MODULES: &[(&str, &str)] = &[
    (
        include_str!("../../assets/shaders/modules/camera.wgsl"),
        "modules/camera.wgsl",
    ),
    (
        include_str!("../../assets/shaders/modules/draw.wgsl"),
        "modules/draw.wgsl",
    ),
    (
        include_str!("../../assets/shaders/modules/lighting.wgsl"),
        "modules/lighting.wgsl",
    ),
];

/// Mesh shading (Lambert + Blinn-Phong, PCF shadows).
pub const MESH_SHADER: &str = include_str!("../../assets/shaders/mesh.wgsl");
/// Depth-only shadow map pass.
pub const SHADOW_SHADER: &str =
    include_str!("../../assets/shaders/shadow.wgsl");
/// Unlit line gizmos.
pub const HELPER_SHADER: &str =
    include_str!("../../assets/shaders/helper.wgsl");

fn composition_error(file_path: &str, e: &ComposerError) -> RenderContextError {
    RenderContextError::ShaderComposition(format!("{file_path}: {e}"))
}

impl ShaderComposer {
    /// Create a composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`RenderContextError::ShaderComposition`] if a shared module
    /// fails to parse.
    pub fn new() -> Result<Self, RenderContextError> {
        let mut composer = Composer::default();
        for &(source, file_path) in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source,
                    file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| composition_error(file_path, &e))?;
        }
        Ok(Self { composer })
    }

    /// Compose a shader source into a `wgpu::ShaderModule` ready for
    /// pipeline creation.
    ///
    /// # Errors
    ///
    /// Returns [`RenderContextError::ShaderComposition`] if an import
    /// cannot be resolved or the source is invalid.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        source: &str,
        file_path: &str,
    ) -> Result<wgpu::ShaderModule, RenderContextError> {
        let naga_module = self
            .compose_naga(source, file_path)
            .map_err(|e| composition_error(file_path, &e))?;

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a shader source into a `naga::Module` without a GPU device.
    ///
    /// # Errors
    ///
    /// Returns the composer error if composition fails.
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
    ) -> Result<naga::Module, Box<ComposerError>> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for (source, file_path) in [
            (MESH_SHADER, "mesh.wgsl"),
            (SHADOW_SHADER, "shadow.wgsl"),
            (HELPER_SHADER, "helper.wgsl"),
        ] {
            let _ = composer.compose_naga(source, file_path).unwrap_or_else(
                |e| panic!("Shader '{file_path}' failed to compose: {e}"),
            );
        }
    }

    #[test]
    fn composed_shaders_validate() {
        let mut composer = ShaderComposer::new().unwrap();
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        for (source, file_path) in [
            (MESH_SHADER, "mesh.wgsl"),
            (SHADOW_SHADER, "shadow.wgsl"),
            (HELPER_SHADER, "helper.wgsl"),
        ] {
            let module = composer.compose_naga(source, file_path).unwrap();
            assert!(
                validator.validate(&module).is_ok(),
                "{file_path} failed validation"
            );
        }
    }

    #[test]
    fn draw_module_composes_on_its_own() {
        let mut composer = ShaderComposer::new().unwrap();
        let source = "#import parallax::draw::DrawUniform\n\
            @group(0) @binding(0) var<uniform> item: DrawUniform;\n\
            @vertex fn vs_main() -> @builtin(position) vec4<f32> { return item.model[3]; }";
        let module = composer.compose_naga(source, "draw_only.wgsl").unwrap();
        assert_eq!(module.global_variables.len(), 1);
    }

    #[test]
    fn unresolved_type_is_an_error() {
        let mut composer = ShaderComposer::new().unwrap();
        let source = "#import parallax::nope::Thing\n\
            @group(0) @binding(0) var<uniform> thing: Thing;\n\
            @vertex fn vs_main() -> @builtin(position) vec4<f32> { return thing.position; }";
        assert!(composer.compose_naga(source, "bad.wgsl").is_err());
    }
}
