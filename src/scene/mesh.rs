use glam::Vec3;

/// Index of a mesh in a [`Scene`](super::Scene)'s mesh store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub(crate) usize);

impl MeshId {
    /// Position in the mesh store.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// CPU-side triangle mesh with a single base color.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals (same length as `positions`).
    pub normals: Vec<Vec3>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Linear RGBA base color.
    pub base_color: [f32; 4],
}

impl MeshData {
    /// A `width` × `height` plane in the XY plane, centered on the origin
    /// and facing +Z.
    #[must_use]
    pub fn plane(width: f32, height: f32, color: [f32; 3]) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self {
            positions: vec![
                Vec3::new(-hw, hh, 0.0),
                Vec3::new(hw, hh, 0.0),
                Vec3::new(-hw, -hh, 0.0),
                Vec3::new(hw, -hh, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
            indices: vec![0, 2, 1, 2, 3, 1],
            base_color: [color[0], color[1], color[2], 1.0],
        }
    }

    /// Build a mesh, filling in missing indices (sequential) and missing
    /// normals (area-weighted smooth normals).
    #[must_use]
    pub fn from_parts(
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        indices: Option<Vec<u32>>,
        base_color: [f32; 4],
    ) -> Self {
        let indices =
            indices.unwrap_or_else(|| (0..positions.len() as u32).collect());
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => smooth_normals(&positions, &indices),
        };
        Self {
            positions,
            normals,
            indices,
            base_color,
        }
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Accumulate unnormalised face normals (their length is twice the
/// triangle area) per vertex, then normalise.
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len()
        {
            continue;
        }
        let face = (positions[b] - positions[a])
            .cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_faces_positive_z_with_ccw_winding() {
        let plane = MeshData::plane(10.0, 4.0, [1.0, 1.0, 1.0]);
        assert_eq!(plane.triangle_count(), 2);
        for tri in plane.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| plane.positions[i as usize]);
            let n = (b - a).cross(c - a).normalize();
            assert!((n - Vec3::Z).length() < 1e-6);
        }
        let xs: Vec<f32> = plane.positions.iter().map(|p| p.x).collect();
        assert!(xs.contains(&5.0) && xs.contains(&-5.0));
    }

    #[test]
    fn missing_normals_and_indices_are_generated() {
        let mesh = MeshData::from_parts(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            None,
            [1.0; 4],
        );
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        for n in &mesh.normals {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn mismatched_normals_are_replaced() {
        let mesh = MeshData::from_parts(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            Some(vec![Vec3::X]),
            Some(vec![0, 1, 2]),
            [1.0; 4],
        );
        assert_eq!(mesh.normals.len(), 3);
    }

    #[test]
    fn out_of_range_indices_do_not_panic() {
        let mesh = MeshData::from_parts(
            vec![Vec3::ZERO, Vec3::X],
            None,
            Some(vec![0, 1, 7]),
            [1.0; 4],
        );
        assert_eq!(mesh.normals, vec![Vec3::Y, Vec3::Y]);
    }
}
