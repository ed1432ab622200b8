//! Lit, shadowed triangle meshes: vertex format, GPU mesh upload, per-draw
//! uniforms, and the main-pass pipeline.

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::{
    gpu::{
        pipeline_helpers, render_context::RenderContextError,
        shader_composer::{ShaderComposer, MESH_SHADER},
    },
    scene::{DrawItem, MeshData, MeshId},
};

/// One draw: a mesh plus its per-draw uniform offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    /// Mesh to draw.
    pub mesh: MeshId,
    /// Dynamic offset into the draw uniform buffer.
    pub offset: u32,
}

/// Interleaved position + normal vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Vertex buffer layout (locations 0 and 1).
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleave a mesh's positions and normals.
    #[must_use]
    pub fn interleave(mesh: &MeshData) -> Vec<Self> {
        mesh.positions
            .iter()
            .zip(&mesh.normals)
            .map(|(p, n)| Self {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect()
    }
}

/// Per-draw uniform, bound at a dynamic offset.
/// NOTE: Must match `parallax::draw::DrawUniform` exactly (160 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    /// Model-to-world matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`.
    pub normal: [[f32; 4]; 4],
    /// Linear RGBA base color.
    pub base_color: [f32; 4],
    /// 1.0 to apply the shadow map.
    pub receive_shadow: f32,
    /// Padding.
    pub _pad: [f32; 3],
}

/// Dynamic-offset stride of [`DrawUniform`] records
/// (`min_uniform_buffer_offset_alignment` of the default limits).
pub const DRAW_UNIFORM_STRIDE: u64 = 256;

impl DrawUniform {
    /// Uniform for one draw item.
    #[must_use]
    pub fn new(item: &DrawItem, base_color: [f32; 4]) -> Self {
        Self {
            model: item.world.to_cols_array_2d(),
            normal: normal_matrix(item.world).to_cols_array_2d(),
            base_color,
            receive_shadow: if item.receive_shadow { 1.0 } else { 0.0 },
            _pad: [0.0; 3],
        }
    }

    /// Binding size for the draw bind group layout.
    #[must_use]
    pub fn binding_size() -> Option<wgpu::BufferSize> {
        wgpu::BufferSize::new(size_of::<Self>() as u64)
    }
}

/// Inverse-transpose, falling back to the matrix itself when singular.
fn normal_matrix(world: Mat4) -> Mat4 {
    if world.determinant().abs() < f32::EPSILON {
        world
    } else {
        world.inverse().transpose()
    }
}

/// Vertex and index buffers of one uploaded mesh.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    /// Upload a mesh.
    #[must_use]
    pub fn upload(device: &wgpu::Device, mesh: &MeshData) -> Self {
        let vertices = Vertex::interleave(mesh);
        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Indices"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    /// Bind the buffers and draw. Bind groups must already be set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(
            self.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Create the main-pass mesh pipeline.
///
/// # Errors
///
/// Returns [`RenderContextError::ShaderComposition`] if `mesh.wgsl` fails
/// to compose.
pub fn create_pipeline(
    device: &wgpu::Device,
    composer: &mut ShaderComposer,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> Result<wgpu::RenderPipeline, RenderContextError> {
    let label = "Mesh Pipeline";
    let shader = composer.compose(device, label, MESH_SHADER, "mesh.wgsl")?;
    let layout =
        pipeline_helpers::pipeline_layout(device, label, bind_group_layouts);

    Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
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
    }))
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn layouts_match_wgsl() {
        assert_eq!(size_of::<Vertex>(), 24);
        assert_eq!(size_of::<DrawUniform>(), 160);
        assert!(size_of::<DrawUniform>() as u64 <= DRAW_UNIFORM_STRIDE);
    }

    #[test]
    fn normals_survive_non_uniform_scale() {
        let item = DrawItem {
            mesh: MeshId(0),
            world: Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0)),
            cast_shadow: false,
            receive_shadow: true,
        };
        let uniform = DrawUniform::new(&item, [1.0; 4]);
        assert_eq!(uniform.receive_shadow, 1.0);

        // A 45° normal in the xy plane tilts toward +y after stretching x
        let normal = Mat4::from_cols_array_2d(&uniform.normal)
            .transform_vector3(Vec3::new(1.0, 1.0, 0.0))
            .normalize();
        assert!(normal.y > normal.x);
    }

    #[test]
    fn singular_world_matrix_does_not_produce_nan() {
        let item = DrawItem {
            mesh: MeshId(0),
            world: Mat4::from_scale(Vec3::ZERO),
            cast_shadow: true,
            receive_shadow: false,
        };
        let uniform = DrawUniform::new(&item, [1.0; 4]);
        assert!(Mat4::from_cols_array_2d(&uniform.normal).is_finite());
    }

    #[test]
    fn interleave_pairs_positions_with_normals() {
        let plane = MeshData::plane(2.0, 2.0, [1.0; 3]);
        let vertices = Vertex::interleave(&plane);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0].position, [-1.0, 1.0, 0.0]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
    }
}
