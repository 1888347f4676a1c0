//! Cylinder mesh generation (with end caps)

use std::f32::consts::TAU;

use super::{MeshData, push_cap};
use crate::constants::CYLINDER_SEGMENTS;

/// Generate a cylinder centered on the origin along the Z axis
pub fn generate_cylinder_mesh(radius: f32, height: f32) -> MeshData {
    generate_cylinder_mesh_with_segments(radius, height, CYLINDER_SEGMENTS)
}

/// Generate a cylinder with a custom segment count
pub fn generate_cylinder_mesh_with_segments(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half = height / 2.0;
    let mut mesh = MeshData::with_capacity(
        (segments as usize + 1) * 4 + 2,
        segments as usize * 12,
    );

    // Side wall: bottom/top vertex pairs sharing a radial normal
    for i in 0..=segments {
        let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
        let normal = [cos, sin, 0.0];
        mesh.push_vertex([radius * cos, radius * sin, -half], normal);
        mesh.push_vertex([radius * cos, radius * sin, half], normal);
    }
    for i in 0..segments {
        let base = i * 2;
        mesh.push_triangle(base, base + 2, base + 1);
        mesh.push_triangle(base + 1, base + 2, base + 3);
    }

    push_cap(&mut mesh, radius, half, segments, true);
    push_cap(&mut mesh, radius, -half, segments, false);

    mesh
}
