//! Box (rectangular prism) mesh generation

use super::MeshData;

/// Face normal plus the two in-plane axes spanning it
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

/// Generate a box mesh with the given `[x, y, z]` dimensions
///
/// Each face gets its own four vertices so normals stay flat:
/// 24 vertices, 12 triangles.
pub fn generate_box_mesh(size: [f32; 3]) -> MeshData {
    let half = [size[0] / 2.0, size[1] / 2.0, size[2] / 2.0];
    let mut mesh = MeshData::with_capacity(24, 36);

    for (normal, u, v) in FACES {
        let corner = |su: f32, sv: f32| {
            let mut p = [0.0; 3];
            for i in 0..3 {
                p[i] = (normal[i] + u[i] * su + v[i] * sv) * half[i];
            }
            p
        };

        let a = mesh.push_vertex(corner(-1.0, -1.0), normal);
        let b = mesh.push_vertex(corner(1.0, -1.0), normal);
        let c = mesh.push_vertex(corner(1.0, 1.0), normal);
        let d = mesh.push_vertex(corner(-1.0, 1.0), normal);
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winding_matches_normals() {
        let mesh = generate_box_mesh([2.0, 2.0, 2.0]);
        for tri in mesh.indices.chunks(3) {
            let p = |i: u32| glam::Vec3::from(mesh.positions[i as usize]);
            let face = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            let normal = glam::Vec3::from(mesh.normals[tri[0] as usize]);
            assert!(face.dot(normal) > 0.0);
        }
    }
}
