//! Scene rendering: shadow map, lit meshes, and the light gizmo.

/// Line gizmo for the directional light.
pub mod helper_pass;
/// Lighting uniform shared by the mesh and shadow shaders.
pub mod lighting;
/// Vertex format, GPU meshes, per-draw uniforms, main pipeline.
pub mod mesh_pass;
/// Shadow pass plus main pass into the window surface.
pub mod scene_renderer;
/// Depth-only shadow map pass.
pub mod shadow_pass;

pub use scene_renderer::SceneRenderer;
