//! Torus mesh generation

use std::f32::consts::TAU;

use super::MeshData;
use crate::constants::{TORUS_RADIAL_SEGMENTS, TORUS_TUBULAR_SEGMENTS};

/// Generate a torus lying in the XY plane
///
/// # Arguments
/// * `radius` - Distance from the center to the middle of the tube
/// * `tube` - Tube radius
pub fn generate_torus_mesh(radius: f32, tube: f32) -> MeshData {
    generate_torus_mesh_with_segments(radius, tube, TORUS_RADIAL_SEGMENTS, TORUS_TUBULAR_SEGMENTS)
}

/// Generate a torus with a custom resolution
pub fn generate_torus_mesh_with_segments(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> MeshData {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);
    let ring = tubular + 1;
    let mut mesh = MeshData::with_capacity(
        ((radial + 1) * ring) as usize,
        (radial * tubular * 6) as usize,
    );

    for i in 0..=radial {
        let (sin_u, cos_u) = (i as f32 / radial as f32 * TAU).sin_cos();
        for j in 0..=tubular {
            let (sin_v, cos_v) = (j as f32 / tubular as f32 * TAU).sin_cos();
            let normal = [cos_v * cos_u, cos_v * sin_u, sin_v];
            let r = radius + tube * cos_v;
            mesh.push_vertex([r * cos_u, r * sin_u, tube * sin_v], normal);
        }
    }

    for i in 0..radial {
        for j in 0..tubular {
            let a = i * ring + j;
            let b = a + ring;
            mesh.push_triangle(a, b, a + 1);
            mesh.push_triangle(a + 1, b, b + 1);
        }
    }

    mesh
}
