//! Draws a [`Scene`] to the window surface: shadow pass, then the lit main
//! pass with optional MSAA resolve and the light gizmo.

use wgpu::util::DeviceExt;

use super::{
    helper_pass::HelperPass,
    lighting::LightingUniform,
    mesh_pass::{self, DrawCall, DrawUniform, GpuMesh, DRAW_UNIFORM_STRIDE},
    shadow_pass::ShadowPass,
};
use crate::{
    camera::{Camera, CameraUniform},
    gpu::{
        dynamic_buffer::{DynamicBuffer, StridedWriter},
        pipeline_helpers,
        render_context::{RenderContext, RenderContextError},
        shader_composer::ShaderComposer,
        texture::RenderTarget,
    },
    options::DisplayOptions,
    render_loop::FrameSink,
    scene::{Lights, Scene},
};

/// Per-draw uniform records the buffer starts with room for.
const INITIAL_DRAWS: usize = 16;

/// Bind group layouts shared by the pipelines.
struct Layouts {
    /// Camera, lighting, shadow map, shadow sampler.
    frame: wgpu::BindGroupLayout,
    /// Lighting only (shadow pass vertex stage).
    shadow: wgpu::BindGroupLayout,
    /// Per-draw uniform with a dynamic offset.
    draw: wgpu::BindGroupLayout,
}

impl Layouts {
    fn new(device: &wgpu::Device) -> Self {
        let both = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let frame =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[
                    pipeline_helpers::uniform_buffer(0, both, None),
                    pipeline_helpers::uniform_buffer(
                        1,
                        wgpu::ShaderStages::FRAGMENT,
                        None,
                    ),
                    pipeline_helpers::depth_texture_2d(2),
                    pipeline_helpers::comparison_sampler(3),
                ],
            });
        let shadow =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Bind Group Layout"),
                entries: &[pipeline_helpers::uniform_buffer(
                    0,
                    wgpu::ShaderStages::VERTEX,
                    None,
                )],
            });
        let draw =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Draw Bind Group Layout"),
                entries: &[pipeline_helpers::uniform_buffer(
                    0,
                    both,
                    DrawUniform::binding_size(),
                )],
            });
        Self {
            frame,
            shadow,
            draw,
        }
    }
}

/// Renders scenes into the window surface.
pub struct SceneRenderer {
    context: RenderContext,
    layouts: Layouts,
    camera_buffer: wgpu::Buffer,
    lighting_buffer: wgpu::Buffer,
    frame_group: wgpu::BindGroup,
    draw_buffer: DynamicBuffer,
    draw_group: wgpu::BindGroup,
    draw_writer: StridedWriter,
    mesh_pipeline: wgpu::RenderPipeline,
    shadow: ShadowPass,
    helper: Option<HelperPass>,
    /// Uploaded meshes, index-aligned with the scene's mesh store.
    meshes: Vec<GpuMesh>,
    depth: RenderTarget,
    msaa: Option<RenderTarget>,
    sample_count: u32,
    clear_color: wgpu::Color,
    shadows: bool,
}

impl SceneRenderer {
    /// Build every pipeline and render target for `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderContextError::ShaderComposition`] if a shader fails
    /// to compose.
    pub fn new(
        context: RenderContext,
        display: &DisplayOptions,
        lights: &Lights,
    ) -> Result<Self, RenderContextError> {
        let device = &context.device;
        let mut composer = ShaderComposer::new()?;
        let layouts = Layouts::new(device);
        let sample_count = display.sample_count();

        let camera_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[CameraUniform::new()]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let lighting_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lighting Buffer"),
                contents: bytemuck::cast_slice(&[LightingUniform::new(
                    lights,
                    display.shadows,
                )]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let map_size = lights
            .directional
            .map_or(1, |key| key.shadow.map_size)
            .min(device.limits().max_texture_dimension_2d);
        let shadow = ShadowPass::new(
            device,
            &mut composer,
            &layouts.shadow,
            &lighting_buffer,
            &layouts.draw,
            map_size,
        )?;
        let shadow_sampler = pipeline_helpers::shadow_sampler(device);
        let frame_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Frame Bind Group"),
                layout: &layouts.frame,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: camera_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: lighting_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(
                            shadow.view(),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(
                            &shadow_sampler,
                        ),
                    },
                ],
            });

        let draw_buffer = DynamicBuffer::new(
            device,
            "Draw Uniforms",
            INITIAL_DRAWS * DRAW_UNIFORM_STRIDE as usize,
            wgpu::BufferUsages::UNIFORM,
        );
        let draw_group =
            create_draw_group(device, &layouts.draw, draw_buffer.buffer());

        let mesh_pipeline = mesh_pass::create_pipeline(
            device,
            &mut composer,
            &[&layouts.frame, &layouts.draw],
            context.format(),
            sample_count,
        )?;

        let helper = match lights.directional {
            Some(key) if display.show_light_helper => Some(HelperPass::new(
                device,
                &mut composer,
                &layouts.frame,
                context.format(),
                sample_count,
                &key,
            )?),
            _ => None,
        };

        let size = context.size();
        let depth = RenderTarget::depth(device, size, sample_count);
        let msaa = (sample_count > 1).then(|| {
            RenderTarget::msaa_color(device, size, context.format(), sample_count)
        });

        let [r, g, b] = display.clear_color.to_linear();
        log::info!(
            "Scene renderer ready ({}x{}, {sample_count}x MSAA, shadow map {map_size})",
            size.0,
            size.1
        );

        Ok(Self {
            context,
            layouts,
            camera_buffer,
            lighting_buffer,
            frame_group,
            draw_buffer,
            draw_group,
            draw_writer: StridedWriter::new(DRAW_UNIFORM_STRIDE as usize),
            mesh_pipeline,
            shadow,
            helper,
            meshes: Vec::new(),
            depth,
            msaa,
            sample_count,
            clear_color: wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: 1.0,
            },
            shadows: display.shadows,
        })
    }

    /// Resize the surface and the size-dependent render targets. Ignores
    /// zero-sized dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        let device = &self.context.device;
        let size = self.context.size();
        self.depth = RenderTarget::depth(device, size, self.sample_count);
        if self.msaa.is_some() {
            self.msaa = Some(RenderTarget::msaa_color(
                device,
                size,
                self.context.format(),
                self.sample_count,
            ));
        }
    }

    /// Reconfigure the surface after it was lost or became outdated.
    pub fn reconfigure(&self) {
        self.context.reconfigure();
    }

    /// Surface width / height.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.context.aspect()
    }

    /// Upload meshes added to the scene since the last frame.
    fn sync_meshes(&mut self, scene: &Scene) {
        let stored = scene.meshes();
        if stored.len() < self.meshes.len() {
            self.meshes.clear();
        }
        let new = &stored[self.meshes.len()..];
        if !new.is_empty() {
            log::debug!("Uploading {} meshes", new.len());
        }
        for mesh in new {
            self.meshes.push(GpuMesh::upload(&self.context.device, mesh));
        }
    }

    /// Pack per-draw uniforms. Returns every draw and the subset that
    /// casts shadows.
    fn write_draws(&mut self, scene: &Scene) -> (Vec<DrawCall>, Vec<DrawCall>) {
        self.draw_writer.clear();
        let mut draws = Vec::new();
        let mut casters = Vec::new();
        for item in scene.draw_list() {
            let base_color =
                scene.mesh(item.mesh).map_or([1.0; 4], |m| m.base_color);
            let offset =
                self.draw_writer.push(&DrawUniform::new(&item, base_color));
            let draw = DrawCall {
                mesh: item.mesh,
                offset,
            };
            draws.push(draw);
            if item.cast_shadow {
                casters.push(draw);
            }
        }

        if self.draw_buffer.write_bytes(
            &self.context.device,
            &self.context.queue,
            self.draw_writer.as_bytes(),
        ) {
            self.draw_group = create_draw_group(
                &self.context.device,
                &self.layouts.draw,
                self.draw_buffer.buffer(),
            );
        }
        (draws, casters)
    }

    fn record_main_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        draws: &[DrawCall],
    ) {
        let (view, resolve_target, store) = match &self.msaa {
            Some(msaa) => (&msaa.view, Some(target), wgpu::StoreOp::Discard),
            None => (target, None, wgpu::StoreOp::Store),
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        });

        pass.set_pipeline(&self.mesh_pipeline);
        pass.set_bind_group(0, &self.frame_group, &[]);
        for draw in draws {
            let Some(mesh) = self.meshes.get(draw.mesh.index()) else {
                continue;
            };
            pass.set_bind_group(1, &self.draw_group, &[draw.offset]);
            mesh.draw(&mut pass);
        }

        if let Some(helper) = &self.helper {
            helper.draw(&mut pass, &self.frame_group);
        }
    }
}

fn create_draw_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: DrawUniform::binding_size(),
            }),
        }],
    })
}

impl FrameSink for SceneRenderer {
    type Error = wgpu::SurfaceError;

    fn render_frame(
        &mut self,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<(), wgpu::SurfaceError> {
        self.sync_meshes(scene);

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(camera);
        let lighting = LightingUniform::new(scene.lights(), self.shadows);
        let queue = &self.context.queue;
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniform]),
        );
        queue.write_buffer(
            &self.lighting_buffer,
            0,
            bytemuck::cast_slice(&[lighting]),
        );

        let (draws, casters) = self.write_draws(scene);

        let frame = self.context.next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.context.create_encoder();
        if lighting.shadows_enabled() {
            self.shadow.record(
                &mut encoder,
                &casters,
                &self.meshes,
                &self.draw_group,
            );
        }
        self.record_main_pass(&mut encoder, &view, &draws);
        self.context.submit(encoder);
        frame.present();
        Ok(())
    }
}
