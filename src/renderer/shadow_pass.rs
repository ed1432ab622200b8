//! Depth-only render of shadow casters from the directional light.

use super::mesh_pass::{DrawCall, GpuMesh, Vertex};
use crate::gpu::{
    pipeline_helpers, render_context::RenderContextError,
    shader_composer::{ShaderComposer, SHADOW_SHADER},
    texture::RenderTarget,
};

/// Owns the shadow map and its pipeline.
pub struct ShadowPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    map: RenderTarget,
    size: u32,
}

impl ShadowPass {
    /// Create the pass with a `size`² shadow map. `lighting_layout` has the
    /// lighting uniform at binding 0 (vertex stage) and `draw_layout` is
    /// the per-draw dynamic uniform layout.
    ///
    /// # Errors
    ///
    /// Returns [`RenderContextError::ShaderComposition`] if `shadow.wgsl`
    /// fails to compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        lighting_layout: &wgpu::BindGroupLayout,
        lighting_buffer: &wgpu::Buffer,
        draw_layout: &wgpu::BindGroupLayout,
        size: u32,
    ) -> Result<Self, RenderContextError> {
        let label = "Shadow Pipeline";
        let shader =
            composer.compose(device, label, SHADOW_SHADER, "shadow.wgsl")?;
        let layout = pipeline_helpers::pipeline_layout(
            device,
            label,
            &[lighting_layout, draw_layout],
        );

        // Positions only; same stride as the main pass vertices
        let attributes = [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        }];
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        attributes: &attributes,
                        ..Vertex::layout()
                    }],
                    compilation_options: Default::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(pipeline_helpers::depth_stencil_state(
                    wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                )),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Lighting Bind Group"),
            layout: lighting_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lighting_buffer.as_entire_binding(),
            }],
        });

        let size = size.max(1);
        Ok(Self {
            pipeline,
            bind_group,
            map: RenderTarget::shadow_map(device, size),
            size,
        })
    }

    /// Shadow map view, for the main pass bind group.
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.map.view
    }

    /// Shadow map resolution.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Record the pass, clearing the map to the far plane first.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        casters: &[DrawCall],
        meshes: &[GpuMesh],
        draw_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        for caster in casters {
            let Some(mesh) = meshes.get(caster.mesh.index()) else {
                continue;
            };
            pass.set_bind_group(1, draw_group, &[caster.offset]);
            mesh.draw(&mut pass);
        }
    }
}
