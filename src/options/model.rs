use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Model", inline)]
#[serde(default)]
/// The glTF model grafted into the scene once loading completes.
pub struct ModelOptions {
    /// `.glb` / `.gltf` path. `None` renders the empty stage.
    #[schemars(skip)]
    pub path: Option<PathBuf>,
    /// Position of the model root.
    pub position: [f32; 3],
    /// Uniform scale of the model root.
    #[schemars(range(min = 0.001, max = 10.0))]
    pub scale: f32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            path: None,
            position: [0.0, -0.5, 0.0],
            scale: 0.08,
        }
    }
}
