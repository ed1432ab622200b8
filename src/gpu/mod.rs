//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, dynamic buffer management,
//! render targets, and shader composition.

/// Growable GPU buffers with automatic reallocation.
pub mod dynamic_buffer;
/// Shared wgpu boilerplate helpers.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Depth, MSAA, and shadow-map render targets.
pub mod texture;
