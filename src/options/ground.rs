use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::HexColor;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Ground", inline)]
#[serde(default)]
/// The two static planes: an upright back wall and the floor.
pub struct GroundOptions {
    /// Plane width and height.
    pub size: [f32; 2],
    /// Plane color.
    #[schemars(with = "String")]
    pub color: HexColor,
    /// Center of the back wall (faces +Z).
    pub wall_position: [f32; 3],
    /// Center of the floor (rotated -90° about X, faces +Y).
    pub floor_position: [f32; 3],
}

impl Default for GroundOptions {
    fn default() -> Self {
        Self {
            size: [10.0, 10.0],
            color: HexColor::new(0xdddddd),
            wall_position: [0.0, 0.8, -1.0],
            floor_position: [0.0, -0.5, 0.0],
        }
    }
}
