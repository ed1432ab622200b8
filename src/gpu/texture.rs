//! Render-target textures: depth buffers, MSAA color, and shadow maps.

/// Depth format used by the main pass and the shadow map.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A render-target texture and its default view.
pub struct RenderTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    /// Create a render target with the given size, format, sample count,
    /// and usage.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Main-pass depth buffer (multisampled to match the color target).
    #[must_use]
    pub fn depth(
        device: &wgpu::Device,
        size: (u32, u32),
        sample_count: u32,
    ) -> Self {
        Self::new(
            device,
            "Depth Buffer",
            size,
            DEPTH_FORMAT,
            sample_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )
    }

    /// Multisampled color target, resolved into the swapchain each frame.
    #[must_use]
    pub fn msaa_color(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        Self::new(
            device,
            "MSAA Color",
            size,
            format,
            sample_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )
    }

    /// Square depth texture rendered by the shadow pass and sampled by the
    /// main pass.
    #[must_use]
    pub fn shadow_map(device: &wgpu::Device, size: u32) -> Self {
        Self::new(
            device,
            "Shadow Map",
            (size, size),
            DEPTH_FORMAT,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING,
        )
    }
}
