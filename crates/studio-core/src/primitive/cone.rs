//! Cone mesh generation (apex up, capped base)

use std::f32::consts::TAU;

use super::{MeshData, push_cap};
use crate::constants::CYLINDER_SEGMENTS;

/// Generate a cone centered on the origin, apex at `+height/2`
pub fn generate_cone_mesh(radius: f32, height: f32) -> MeshData {
    generate_cone_mesh_with_segments(radius, height, CYLINDER_SEGMENTS)
}

/// Generate a cone with a custom segment count
///
/// The apex is duplicated per segment so each slice of the mantle
/// carries its own smooth normal.
pub fn generate_cone_mesh_with_segments(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half = height / 2.0;
    let mut mesh = MeshData::with_capacity(
        (segments as usize + 1) * 3 + 1,
        segments as usize * 6,
    );

    // Mantle normal tilts up by the slope angle
    let slant = (radius * radius + height * height).sqrt().max(f32::EPSILON);
    let (n_xy, n_z) = (height / slant, radius / slant);

    for i in 0..=segments {
        let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
        let normal = [cos * n_xy, sin * n_xy, n_z];
        mesh.push_vertex([radius * cos, radius * sin, -half], normal);
        mesh.push_vertex([0.0, 0.0, half], normal);
    }
    for i in 0..segments {
        let base = i * 2;
        mesh.push_triangle(base, base + 2, base + 1);
    }

    push_cap(&mut mesh, radius, -half, segments, false);

    mesh
}
