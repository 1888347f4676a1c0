//! Procedural primitive meshes
//!
//! All generators are centered on the origin with Z as the up axis:
//! - Box (cube)
//! - Sphere (UV sphere)
//! - Cylinder and cone (along Z, with caps)
//! - Torus (ring in the XY plane)

mod box_mesh;
mod cone;
mod cylinder;
mod sphere;
mod torus;

pub use box_mesh::generate_box_mesh;
pub use cone::{generate_cone_mesh, generate_cone_mesh_with_segments};
pub use cylinder::{generate_cylinder_mesh, generate_cylinder_mesh_with_segments};
pub use sphere::{generate_sphere_mesh, generate_sphere_mesh_with_segments};
pub use torus::{generate_torus_mesh, generate_torus_mesh_with_segments};

/// Vertex positions, per-vertex normals and triangle indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub(crate) fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    /// Append a vertex and return its index
    pub(crate) fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        index
    }

    pub(crate) fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns true if there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }
}

/// Emit a closed disc fan at height `z`, facing up or down
pub(crate) fn push_cap(mesh: &mut MeshData, radius: f32, z: f32, segments: u32, facing_up: bool) {
    let normal = if facing_up {
        [0.0, 0.0, 1.0]
    } else {
        [0.0, 0.0, -1.0]
    };
    let center = mesh.push_vertex([0.0, 0.0, z], normal);
    let rim_start = mesh.positions.len() as u32;
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * std::f32::consts::TAU;
        mesh.push_vertex([radius * theta.cos(), radius * theta.sin(), z], normal);
    }
    for i in 0..segments {
        let (a, b) = (rim_start + i, rim_start + i + 1);
        if facing_up {
            mesh.push_triangle(center, a, b);
        } else {
            mesh.push_triangle(center, b, a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extents(mesh: &MeshData) -> [f32; 3] {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in &mesh.positions {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        [max[0] - min[0], max[1] - min[1], max[2] - min[2]]
    }

    fn assert_well_formed(mesh: &MeshData) {
        assert!(!mesh.is_empty());
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert_eq!(mesh.indices.len() % 3, 0);
        let count = mesh.positions.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_box_mesh() {
        let mesh = generate_box_mesh([1.0, 1.0, 1.0]);
        assert_eq!(mesh.positions.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_well_formed(&mesh);
    }

    #[test]
    fn test_box_dimensions() {
        let e = extents(&generate_box_mesh([2.0, 4.0, 6.0]));
        assert!((e[0] - 2.0).abs() < 1e-4);
        assert!((e[1] - 4.0).abs() < 1e-4);
        assert!((e[2] - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_mesh() {
        let mesh = generate_sphere_mesh(2.0);
        assert_well_formed(&mesh);
        let e = extents(&mesh);
        assert!((e[2] - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_cylinder_and_cone() {
        let cylinder = generate_cylinder_mesh(1.5, 4.0);
        assert_well_formed(&cylinder);
        assert!((extents(&cylinder)[2] - 4.0).abs() < 1e-4);

        let cone = generate_cone_mesh(1.5, 4.0);
        assert_well_formed(&cone);
        assert!((extents(&cone)[2] - 4.0).abs() < 1e-4);
        assert!((extents(&cone)[0] - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_torus_mesh() {
        let mesh = generate_torus_mesh(2.0, 0.5);
        assert_well_formed(&mesh);
        let e = extents(&mesh);
        assert!((e[0] - 5.0).abs() < 1e-3);
        assert!((e[2] - 1.0).abs() < 1e-3);
    }
}
