//! Line gizmo for the directional light.

use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::{
    gpu::{
        pipeline_helpers, render_context::RenderContextError,
        shader_composer::{HELPER_SHADER, ShaderComposer},
    },
    scene::DirectionalLight,
};

/// Side length of the light gizmo's square.
const GIZMO_SIZE: f32 = 1.0;

/// Line-list vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
}

/// Gizmo vertices (two per segment) for a directional light.
#[must_use]
pub fn light_gizmo(light: &DirectionalLight) -> Vec<LineVertex> {
    light
        .helper_lines(GIZMO_SIZE)
        .into_iter()
        .flat_map(|[a, b]: [Vec3; 2]| {
            [a, b].map(|p| LineVertex {
                position: p.to_array(),
                color: light.color,
            })
        })
        .collect()
}

/// Draws the light gizmo as an unlit line list.
pub struct HelperPass {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl HelperPass {
    /// Create the pipeline and upload the gizmo for `light`.
    /// `camera_layout` must expose the camera uniform at binding 0.
    ///
    /// # Errors
    ///
    /// Returns [`RenderContextError::ShaderComposition`] if `helper.wgsl`
    /// fails to compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        camera_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
        sample_count: u32,
        light: &DirectionalLight,
    ) -> Result<Self, RenderContextError> {
        let label = "Light Helper Pipeline";
        let shader =
            composer.compose(device, label, HELPER_SHADER, "helper.wgsl")?;
        let layout =
            pipeline_helpers::pipeline_layout(device, label, &[camera_layout]);

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: size_of::<LineVertex>()
                            as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &LineVertex::ATTRIBUTES,
                    }],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::LineList,
                    ..Default::default()
                },
                depth_stencil: Some(pipeline_helpers::depth_stencil_state(
                    wgpu::DepthBiasState::default(),
                )),
                multisample: wgpu::MultisampleState {
                    count: sample_count,
                    ..Default::default()
                },
                multiview: None,
                cache: None,
            });

        let vertices = light_gizmo(light);
        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Light Helper Vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Ok(Self {
            pipeline,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        })
    }

    /// Draw into an open main pass. `camera_group` must match the layout
    /// given to [`new`](Self::new).
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        camera_group: &wgpu::BindGroup,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DirectionalLightOptions;

    #[test]
    fn gizmo_has_two_vertices_per_segment() {
        let light =
            DirectionalLight::from_options(&DirectionalLightOptions::default());
        let vertices = light_gizmo(&light);
        assert_eq!(vertices.len(), 10);
        assert_eq!(vertices[8].position, light.position.to_array());
        assert_eq!(vertices[9].position, light.target.to_array());
        assert!(vertices.iter().all(|v| v.color == light.color));
    }
}
