//! Flat mesh built from a parse session.
//!
//! This is the hand-off format between the LDraw flattener and whatever
//! displays the part: shared positions, triangle and quad faces, optional
//! smooth normals and a bounding box. Cleanup (welding, normals, the
//! coordinate fix-up) happens here, after parsing.

use std::collections::HashMap;

use ldr_math::{z_up_fixup, Aabb, Mat4, Mat4Ext, Vec3};

use crate::config::CleanupConfig;
use crate::ldraw::{Face, ParseSession};

/// Interleaved vertex layout for GPU upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// A polygon mesh of triangles and quads.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Faces indexing into `positions`
    pub faces: Vec<Face>,

    /// Vertex normals (optional - call `compute_normals()`)
    pub normals: Option<Vec<Vec3>>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and faces.
    pub fn new(positions: Vec<Vec3>, faces: Vec<Face>) -> Self {
        let bounds = Aabb::from_iter_points(&positions);
        Self {
            positions,
            faces,
            normals: None,
            bounds,
        }
    }

    /// Copy the flattened geometry out of a session.
    pub fn from_session(session: &ParseSession) -> Self {
        Self::new(session.vertices.clone(), session.faces.clone())
    }

    /// Run the configured cleanup steps: weld, normals, coordinate fix-up.
    pub fn cleanup(&mut self, config: &CleanupConfig) {
        if let Some(threshold) = config.weld_threshold {
            let removed = self.weld(threshold);
            log::debug!("Welded {} vertices (threshold {})", removed, threshold);
        }
        if config.compute_normals {
            self.compute_normals();
        }

        let fixup = if config.rotate_to_z_up {
            z_up_fixup(config.scale)
        } else {
            Mat4::from_scale(Vec3::splat(config.scale))
        };
        if !fixup.is_identity() {
            self.transform(&fixup);
        }
    }

    /// Merge vertices closer than `threshold` and return how many were removed.
    ///
    /// The first vertex of a cluster is kept, later ones are redirected to it.
    /// Faces left with fewer than three distinct corners are dropped, and
    /// quads left with three become triangles. A zero threshold merges only
    /// exact duplicates.
    pub fn weld(&mut self, threshold: f32) -> usize {
        let threshold = threshold.max(0.0);
        let original = self.positions.len();

        let mut kept: Vec<Vec3> = Vec::with_capacity(original);
        let mut remap: Vec<u32> = Vec::with_capacity(original);

        if threshold == 0.0 {
            let mut exact: HashMap<[u32; 3], u32> = HashMap::new();
            for position in &self.positions {
                let key = position.to_array().map(f32::to_bits);
                let index = *exact.entry(key).or_insert_with(|| {
                    kept.push(*position);
                    (kept.len() - 1) as u32
                });
                remap.push(index);
            }
        } else {
            let mut grid: HashMap<[i64; 3], Vec<u32>> = HashMap::new();
            let cell_of = |p: Vec3| (p / threshold).floor().to_array().map(|c| c as i64);

            for position in &self.positions {
                let cell = cell_of(*position);
                let existing = neighbor_cells(cell)
                    .filter_map(|neighbor| grid.get(&neighbor))
                    .flatten()
                    .copied()
                    .filter(|&candidate| kept[candidate as usize].distance(*position) <= threshold)
                    .min();

                let index = existing.unwrap_or_else(|| {
                    kept.push(*position);
                    let index = (kept.len() - 1) as u32;
                    grid.entry(cell).or_default().push(index);
                    index
                });
                remap.push(index);
            }
        }

        self.faces = self
            .faces
            .iter()
            .filter_map(|face| remap_face(face, &remap))
            .collect();
        self.positions = kept;
        self.normals = None;
        self.bounds = Aabb::from_iter_points(&self.positions);

        original - self.positions.len()
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Each face contributes its fan triangles' normals (counter-clockwise
    /// winding) to its corners. Vertices used by no face get +Y.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for triangle in self.triangulate().chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = Some(normals);
    }

    /// Apply an affine transform to positions and normals.
    pub fn transform(&mut self, matrix: &Mat4) {
        for position in &mut self.positions {
            *position = matrix.transform_point3(*position);
        }

        if let Some(normals) = &mut self.normals {
            let normal_matrix = matrix.inverse().transpose();
            for normal in normals.iter_mut() {
                *normal = normal_matrix
                    .transform_vector3(*normal)
                    .try_normalize()
                    .unwrap_or(*normal);
            }
        }

        self.bounds = matrix.transform_aabb(&self.bounds);
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Fan-triangulate every face into a flat index list.
    ///
    /// Quad (0,1,2,3) -> triangles (0,1,2) and (0,2,3).
    pub fn triangulate(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity(self.triangle_count() * 3);
        for face in &self.faces {
            let corners = face.indices();
            for i in 1..corners.len() - 1 {
                indices.extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
            }
        }
        indices
    }

    /// Number of triangles after fan triangulation.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|face| face.corner_count() - 2).sum()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Interleaved position/normal buffer. Missing normals are zero.
    pub fn vertex_buffer(&self) -> Vec<GpuVertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, position)| GpuVertex {
                position: position.to_array(),
                normal: self
                    .normals
                    .as_ref()
                    .and_then(|normals| normals.get(i))
                    .map(|normal| normal.to_array())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Raw bytes of [`vertex_buffer`](Self::vertex_buffer), native endian.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.vertex_buffer()).to_vec()
    }

    /// Triangle index buffer for indexed drawing.
    pub fn index_buffer(&self) -> Vec<u32> {
        self.triangulate()
    }
}

fn neighbor_cells(cell: [i64; 3]) -> impl Iterator<Item = [i64; 3]> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| [cell[0] + dx, cell[1] + dy, cell[2] + dz]))
    })
}

fn remap_face(face: &Face, remap: &[u32]) -> Option<Face> {
    let mut corners: Vec<u32> = Vec::with_capacity(4);
    for &index in face.indices() {
        let mapped = remap[index as usize];
        if corners.last() != Some(&mapped) {
            corners.push(mapped);
        }
    }
    // Wrap-around duplicate
    if corners.len() > 1 && corners.first() == corners.last() {
        corners.pop();
    }
    if corners.len() == 4 && (corners[0] == corners[2] || corners[1] == corners[3]) {
        return None;
    }
    Face::from_indices(&corners)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![Face::Quad([0, 1, 2, 3])],
        )
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = unit_quad();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.has_normals());
        assert_eq!(mesh.bounds.max(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_triangulate_mixed() {
        let mut mesh = unit_quad();
        mesh.faces.push(Face::Tri([3, 2, 0]));

        assert_eq!(mesh.triangulate(), vec![0, 1, 2, 0, 2, 3, 3, 2, 0]);
        assert_eq!(mesh.index_buffer().len(), mesh.triangle_count() * 3);
    }

    #[test]
    fn test_compute_normals() {
        let mut mesh = unit_quad();
        mesh.compute_normals();

        // Counter-clockwise viewed from +Z
        for normal in mesh.normals.as_ref().unwrap() {
            assert!((*normal - Vec3::Z).length() < 0.001);
        }
    }

    #[test]
    fn test_weld_exact_duplicates() {
        // Two triangles sharing an edge, emitted without sharing vertices
        let mut mesh = Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![Face::Tri([0, 1, 2]), Face::Tri([3, 4, 5])],
        );

        let removed = mesh.weld(0.0);

        assert_eq!(removed, 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![Face::Tri([0, 1, 2]), Face::Tri([1, 3, 2])]);
    }

    #[test]
    fn test_weld_within_threshold() {
        let mut mesh = Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(0.0, 10.0, 0.0),
                Vec3::new(0.05, 0.0, 0.0),
                Vec3::new(10.0, 10.0, 0.0),
                Vec3::new(0.0, 10.04, 0.0),
            ],
            vec![Face::Tri([0, 1, 2]), Face::Tri([3, 4, 5])],
        );

        assert_eq!(mesh.weld(0.1), 2);
        assert_eq!(mesh.faces[1], Face::Tri([0, 3, 2]));
        assert_eq!(mesh.positions[0], Vec3::ZERO);
    }

    #[test]
    fn test_weld_collapses_faces() {
        let mut mesh = Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.01, 0.0, 0.0),
                Vec3::new(5.0, 0.0, 0.0),
                Vec3::new(0.0, 5.0, 0.0),
            ],
            vec![Face::Quad([0, 1, 2, 3]), Face::Tri([0, 1, 2])],
        );

        mesh.weld(0.1);

        // Quad loses a corner, the sliver triangle disappears
        assert_eq!(mesh.faces, vec![Face::Tri([0, 1, 2])]);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_transform_updates_bounds_and_normals() {
        let mut mesh = unit_quad();
        mesh.compute_normals();
        mesh.transform(&z_up_fixup(2.0));

        // LDraw +Y points down, so it ends up along -Z
        assert!((mesh.positions[3] - Vec3::new(0.0, 0.0, -2.0)).length() < 0.001);
        assert!((mesh.bounds.min().z + 2.0).abs() < 0.001);
        assert!((mesh.bounds.max().x - 2.0).abs() < 0.001);
        let normal = mesh.normals.as_ref().unwrap()[0];
        assert!((normal - Vec3::new(0.0, 1.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_cleanup_pipeline() {
        let mut mesh = unit_quad();
        mesh.positions.push(Vec3::new(0.0, 0.0, 0.0));
        mesh.faces.push(Face::Tri([4, 1, 2]));

        mesh.cleanup(&CleanupConfig::default());

        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.has_normals());
        // 1 LDU = 0.4 mm
        assert!((mesh.positions[3] - Vec3::new(0.0, 0.0, -0.0004)).length() < 1e-6);
        assert!((mesh.positions[2] - Vec3::new(0.0004, 0.0, -0.0004)).length() < 1e-6);
    }

    #[test]
    fn test_cleanup_none_is_noop() {
        let mut mesh = unit_quad();
        let before = mesh.positions.clone();

        mesh.cleanup(&CleanupConfig::none());

        assert_eq!(mesh.positions, before);
        assert!(!mesh.has_normals());
    }

    #[test]
    fn test_vertex_buffer_layout() {
        let mut mesh = unit_quad();
        assert_eq!(mesh.vertex_buffer()[2].normal, [0.0; 3]);

        mesh.compute_normals();
        let buffer = mesh.vertex_buffer();
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer[2].position, [1.0, 1.0, 0.0]);
        assert_eq!(mesh.vertex_bytes().len(), 4 * std::mem::size_of::<GpuVertex>());
        assert_eq!(std::mem::size_of::<GpuVertex>(), 24);
    }

    #[test]
    fn test_from_session() {
        let mut session = ParseSession::new();
        let a = session.push_vertex(Vec3::ZERO);
        let b = session.push_vertex(Vec3::X);
        let c = session.push_vertex(Vec3::Y);
        session.faces.push(Face::Tri([a, b, c]));

        let mesh = Mesh::from_session(&session);
        assert_eq!(mesh.positions, session.vertices);
        assert_eq!(mesh.faces, session.faces);
    }
}
