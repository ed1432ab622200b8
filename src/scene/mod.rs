//! Scene graph: owned node trees, a flat mesh store, and the light set.
//!
//! The scene is built once by [`bootstrap`] and grows by exactly one
//! node tree when the model finishes loading ([`Scene::graft`]).

mod bootstrap;
/// Ambient and directional lights, shadow camera.
pub mod light;
/// Background glTF import and placement.
pub mod loader;
/// Triangle meshes and their ids.
pub mod mesh;
/// Scene nodes and TRS transforms.
pub mod node;

pub use bootstrap::bootstrap;
use glam::{Mat4, Vec3};
pub use light::{AmbientLight, DirectionalLight, Lights, ShadowSettings};
pub use loader::{ModelFragment, PendingModel, Placement};
pub use mesh::{MeshData, MeshId};
pub use node::{SceneNode, Transform};

/// One mesh instance to draw, flattened from the node trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// Mesh to draw.
    pub mesh: MeshId,
    /// Model-to-world matrix.
    pub world: Mat4,
    /// Include in the shadow pass.
    pub cast_shadow: bool,
    /// Apply the shadow map when shading.
    pub receive_shadow: bool,
}

/// The scene. Owns all node trees, meshes, and lights.
pub struct Scene {
    roots: Vec<SceneNode>,
    meshes: Vec<MeshData>,
    lights: Lights,
    /// Bumped on every structural change.
    generation: u64,
}

impl Scene {
    /// An empty scene lit by `lights`.
    #[must_use]
    pub fn new(lights: Lights) -> Self {
        Self {
            roots: Vec::new(),
            meshes: Vec::new(),
            lights,
            generation: 0,
        }
    }

    /// Store a mesh and return its id.
    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        self.meshes.push(mesh);
        self.generation += 1;
        MeshId(self.meshes.len() - 1)
    }

    /// Add a top-level node. Its mesh ids must come from
    /// [`add_mesh`](Self::add_mesh).
    pub fn add(&mut self, node: SceneNode) {
        self.roots.push(node);
        self.generation += 1;
    }

    /// Insert a loaded model as one new top-level node.
    ///
    /// The fragment's meshes move into the scene store, its root gets the
    /// placement's position and uniform scale, and every node in it is
    /// flagged as a shadow caster.
    pub fn graft(&mut self, fragment: ModelFragment, placement: Placement) {
        let ModelFragment { mut root, meshes } = fragment;
        let base = self.meshes.len();
        self.meshes.extend(meshes);

        root.transform.translation = placement.position;
        root.transform.scale = Vec3::splat(placement.scale);
        root.traverse_mut(&mut |node| {
            node.cast_shadow = true;
            for mesh in &mut node.meshes {
                mesh.0 += base;
            }
        });

        log::info!(
            "Model '{}' added ({} nodes, {} meshes)",
            root.name,
            root.node_count(),
            self.meshes.len() - base
        );
        self.add(root);
    }

    /// Flatten every node tree into draw items, in root order.
    #[must_use]
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut draws = Vec::new();
        for root in &self.roots {
            root.visit_meshes(Mat4::IDENTITY, &mut |node, mesh, world| {
                if mesh.index() < self.meshes.len() {
                    draws.push(DrawItem {
                        mesh,
                        world,
                        cast_shadow: node.cast_shadow,
                        receive_shadow: node.receive_shadow,
                    });
                }
            });
        }
        draws
    }

    /// Top-level nodes in insertion order.
    #[must_use]
    pub fn roots(&self) -> &[SceneNode] {
        &self.roots
    }

    /// The mesh store.
    #[must_use]
    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    /// Look up a mesh.
    #[must_use]
    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0)
    }

    /// The light set.
    #[must_use]
    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    /// Structural change counter.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    #[test]
    fn graft_inserts_one_tree_with_placement_and_shadow_flags() {
        let (mut scene, _) = bootstrap(&Options::default(), 1.0);
        let roots_before = scene.roots().len();
        let generation = scene.generation();

        scene.graft(
            loader::tests::triangle(),
            Placement {
                position: Vec3::new(0.0, -0.5, 0.0),
                scale: 0.08,
            },
        );

        assert_eq!(scene.roots().len(), roots_before + 1);
        assert!(scene.generation() > generation);

        let model = &scene.roots()[roots_before];
        assert_eq!(model.transform.translation, Vec3::new(0.0, -0.5, 0.0));
        assert_eq!(model.transform.scale, Vec3::splat(0.08));
        let mut all_cast = true;
        model.traverse(&mut |n| all_cast &= n.cast_shadow);
        assert!(all_cast);
    }

    #[test]
    fn grafted_mesh_ids_are_remapped() {
        let (mut scene, _) = bootstrap(&Options::default(), 1.0);
        scene.graft(loader::tests::triangle(), Placement::default());

        let draws = scene.draw_list();
        assert_eq!(draws.len(), 3);
        let model = draws[2];
        assert_eq!(model.mesh, MeshId(1));
        assert!(model.cast_shadow && !model.receive_shadow);
        assert_eq!(
            scene.mesh(model.mesh).map(|m| m.base_color),
            Some([1.0, 0.0, 0.0, 1.0])
        );

        // placement * gltf root translation * node scale
        let tip = model.world.transform_point3(Vec3::X);
        let expected = Vec3::new(0.0, -0.5, 0.0) + 0.08 * (Vec3::Y + 2.0 * Vec3::X);
        assert!((tip - expected).length() < 1e-6);
    }

    #[test]
    fn dangling_mesh_ids_are_not_drawn() {
        let mut scene = Scene::new(Lights::default());
        scene.add(SceneNode::new("ghost").with_mesh(MeshId(3)));
        assert!(scene.draw_list().is_empty());
    }
}
