use glam::{Mat4, Quat, Vec3};

use super::mesh::MeshId;

/// Translation / rotation / scale of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation.
    pub translation: Vec3,
    /// Rotation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, rotation or scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Pure translation.
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Local matrix (scale, then rotate, then translate).
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.translation,
        )
    }
}

/// A node in the scene graph. Nodes own their children.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Display name (from the model file, or set by the bootstrap).
    pub name: String,
    /// Transform relative to the parent.
    pub transform: Transform,
    /// Meshes drawn at this node.
    pub meshes: Vec<MeshId>,
    /// Rendered into the shadow map.
    pub cast_shadow: bool,
    /// Darkened by the shadow map.
    pub receive_shadow: bool,
    /// Child nodes.
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// An empty group node.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            meshes: Vec::new(),
            cast_shadow: false,
            receive_shadow: false,
            children: Vec::new(),
        }
    }

    /// Builder: attach a mesh.
    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.meshes.push(mesh);
        self
    }

    /// Builder: set the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: append a child.
    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Visit this node and all descendants depth-first, parents first.
    pub fn traverse(&self, f: &mut impl FnMut(&SceneNode)) {
        f(self);
        for child in &self.children {
            child.traverse(f);
        }
    }

    /// Mutable depth-first visit of this node and all descendants.
    pub fn traverse_mut(&mut self, f: &mut impl FnMut(&mut SceneNode)) {
        f(self);
        for child in &mut self.children {
            child.traverse_mut(f);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |_| count += 1);
        count
    }

    /// Visit every mesh with its world matrix, given the parent's world
    /// matrix.
    pub(crate) fn visit_meshes(
        &self,
        parent: Mat4,
        f: &mut impl FnMut(&SceneNode, MeshId, Mat4),
    ) {
        let world = parent * self.transform.matrix();
        for &mesh in &self.meshes {
            f(self, mesh, world);
        }
        for child in &self.children {
            child.visit_meshes(world, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> SceneNode {
        SceneNode::new("root")
            .with_child(
                SceneNode::new("a").with_child(SceneNode::new("a.1")),
            )
            .with_child(SceneNode::new("b"))
    }

    #[test]
    fn traverse_is_depth_first_parents_first() {
        let mut names = Vec::new();
        tree().traverse(&mut |n| names.push(n.name.clone()));
        assert_eq!(names, ["root", "a", "a.1", "b"]);
        assert_eq!(tree().node_count(), 4);
    }

    #[test]
    fn traverse_mut_reaches_every_node() {
        let mut root = tree();
        root.traverse_mut(&mut |n| n.cast_shadow = true);
        let mut all = true;
        root.traverse(&mut |n| all &= n.cast_shadow);
        assert!(all);
    }

    #[test]
    fn world_matrices_compose_parent_first() {
        let root = SceneNode::new("root")
            .with_transform(Transform {
                translation: Vec3::new(0.0, -0.5, 0.0),
                scale: Vec3::splat(2.0),
                ..Transform::IDENTITY
            })
            .with_child(
                SceneNode::new("leaf")
                    .with_transform(Transform::from_translation(Vec3::X))
                    .with_mesh(MeshId(0)),
            );

        let mut hits = Vec::new();
        root.visit_meshes(Mat4::IDENTITY, &mut |node, mesh, world| {
            hits.push((node.name.clone(), mesh, world));
        });
        assert_eq!(hits.len(), 1);
        let (name, mesh, world) = &hits[0];
        assert_eq!(name, "leaf");
        assert_eq!(*mesh, MeshId(0));
        let origin = world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(2.0, -0.5, 0.0)).length() < 1e-6);
    }
}
