//! Background glTF loading.
//!
//! A model file is imported on a one-shot `model-loader` thread into a
//! self-contained [`ModelFragment`]; the render loop polls the
//! [`PendingModel`] each frame and grafts the fragment once it arrives.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, TryRecvError},
};

use glam::{Quat, Vec3};

use super::{
    mesh::{MeshData, MeshId},
    node::{SceneNode, Transform},
};
use crate::{error::ParallaxError, options::ModelOptions};

/// A loaded model: one root node plus the meshes it references.
///
/// Mesh ids inside the fragment index into `meshes`; they are remapped
/// when the fragment is grafted into a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFragment {
    /// Root of the model hierarchy.
    pub root: SceneNode,
    /// Meshes owned by the fragment.
    pub meshes: Vec<MeshData>,
}

impl ModelFragment {
    /// Import a `.glb` / `.gltf` file.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::ModelLoad`] if the file cannot be read or
    /// contains no scene.
    pub fn import(path: &Path) -> Result<Self, ParallaxError> {
        let (document, buffers, _images) = gltf::import(path)?;
        let name = path
            .file_stem()
            .map_or_else(|| "model".to_owned(), |s| s.to_string_lossy().into());
        Self::from_gltf(&document, &buffers, name)
    }

    /// Import from an in-memory glTF / GLB blob.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::ModelLoad`] if the data is not valid glTF
    /// or contains no scene.
    pub fn import_slice(bytes: &[u8]) -> Result<Self, ParallaxError> {
        let (document, buffers, _images) = gltf::import_slice(bytes)?;
        Self::from_gltf(&document, &buffers, "model".to_owned())
    }

    fn from_gltf(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        name: String,
    ) -> Result<Self, ParallaxError> {
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| {
                ParallaxError::ModelLoad(format!("{name}: no scene"))
            })?;

        let mut builder = FragmentBuilder {
            buffers,
            meshes: Vec::new(),
            primitives: HashMap::new(),
        };
        let mut root = SceneNode::new(name);
        for node in scene.nodes() {
            root.children.push(builder.node(&node));
        }

        log::debug!(
            "Imported {} nodes, {} meshes",
            root.node_count(),
            builder.meshes.len()
        );
        Ok(Self {
            root,
            meshes: builder.meshes,
        })
    }
}

struct FragmentBuilder<'a> {
    buffers: &'a [gltf::buffer::Data],
    meshes: Vec<MeshData>,
    /// glTF mesh index -> converted primitives, for instanced meshes.
    primitives: HashMap<usize, Vec<MeshId>>,
}

impl FragmentBuilder<'_> {
    fn node(&mut self, node: &gltf::Node) -> SceneNode {
        let (t, r, s) = node.transform().decomposed();
        let mut out = SceneNode::new(
            node.name().map_or_else(
                || format!("node{}", node.index()),
                str::to_owned,
            ),
        )
        .with_transform(Transform {
            translation: Vec3::from(t),
            rotation: Quat::from_array(r),
            scale: Vec3::from(s),
        });

        if let Some(mesh) = node.mesh() {
            out.meshes = self.mesh(&mesh);
        }
        for child in node.children() {
            out.children.push(self.node(&child));
        }
        out
    }

    fn mesh(&mut self, mesh: &gltf::Mesh) -> Vec<MeshId> {
        if let Some(ids) = self.primitives.get(&mesh.index()) {
            return ids.clone();
        }
        let mut ids = Vec::new();
        for prim in mesh.primitives() {
            if prim.mode() != gltf::mesh::Mode::Triangles {
                log::debug!(
                    "Skipping {:?} primitive in mesh {}",
                    prim.mode(),
                    mesh.index()
                );
                continue;
            }
            let buffers = self.buffers;
            let reader = prim.reader(|b| Some(&buffers[b.index()]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<Vec3> = positions.map(Vec3::from).collect();
            let normals = reader
                .read_normals()
                .map(|n| n.map(Vec3::from).collect());
            let indices =
                reader.read_indices().map(|i| i.into_u32().collect());
            let base_color = prim
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();

            ids.push(MeshId(self.meshes.len()));
            self.meshes.push(MeshData::from_parts(
                positions, normals, indices, base_color,
            ));
        }
        let _ = self.primitives.insert(mesh.index(), ids.clone());
        ids
    }
}

/// Where a loaded model goes in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Root position.
    pub position: Vec3,
    /// Uniform root scale.
    pub scale: f32,
}

impl Placement {
    /// From the `[model]` options section.
    #[must_use]
    pub fn from_options(options: &ModelOptions) -> Self {
        Self {
            position: Vec3::from_array(options.position),
            scale: options.scale,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::from_options(&ModelOptions::default())
    }
}

/// A model load in flight. Yields its result exactly once.
pub struct PendingModel {
    rx: Option<Receiver<Result<ModelFragment, ParallaxError>>>,
}

impl PendingModel {
    /// Start importing `path` on a `model-loader` thread.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::ThreadSpawn`] if the thread fails to spawn.
    pub fn spawn(path: PathBuf) -> Result<Self, ParallaxError> {
        log::info!("Loading model {}", path.display());
        Self::with_loader(move || ModelFragment::import(&path))
    }

    /// Run an arbitrary loader on a `model-loader` thread.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::ThreadSpawn`] if the thread fails to spawn.
    pub fn with_loader<F>(load: F) -> Result<Self, ParallaxError>
    where
        F: FnOnce() -> Result<ModelFragment, ParallaxError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let _ = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                // Receiver gone means the viewer shut down first
                let _ = tx.send(load());
            })
            .map_err(ParallaxError::ThreadSpawn)?;
        Ok(Self { rx: Some(rx) })
    }

    /// An already-completed load.
    #[must_use]
    pub fn ready(result: Result<ModelFragment, ParallaxError>) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self { rx: Some(rx) }
    }

    /// Non-blocking check. Returns the result the first time it is
    /// available and `None` before and after that.
    pub fn poll(&mut self) -> Option<Result<ModelFragment, ParallaxError>> {
        let rx = self.rx.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(ParallaxError::ModelLoad(
                "model loader exited without a result".into(),
            )),
        };
        self.rx = None;
        Some(result)
    }

    /// Whether the result has not been taken yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }
}
