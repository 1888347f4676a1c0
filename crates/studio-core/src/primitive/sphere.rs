//! Sphere mesh generation (UV sphere)

use std::f32::consts::{PI, TAU};

use super::MeshData;
use crate::constants::{SPHERE_LAT_SEGMENTS, SPHERE_LON_SEGMENTS};

/// Generate a UV sphere with the default resolution
pub fn generate_sphere_mesh(radius: f32) -> MeshData {
    generate_sphere_mesh_with_segments(radius, SPHERE_LAT_SEGMENTS, SPHERE_LON_SEGMENTS)
}

/// Generate a UV sphere with custom resolution
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `lat_segments` - Number of latitude bands (pole to pole)
/// * `lon_segments` - Number of longitude segments around Z
pub fn generate_sphere_mesh_with_segments(
    radius: f32,
    lat_segments: u32,
    lon_segments: u32,
) -> MeshData {
    let lat_segments = lat_segments.max(2);
    let lon_segments = lon_segments.max(3);
    let ring = lon_segments + 1;
    let mut mesh = MeshData::with_capacity(
        ((lat_segments + 1) * ring) as usize,
        (lat_segments * lon_segments * 6) as usize,
    );

    for lat in 0..=lat_segments {
        let (sin_theta, cos_theta) = (lat as f32 / lat_segments as f32 * PI).sin_cos();
        for lon in 0..=lon_segments {
            let (sin_phi, cos_phi) = (lon as f32 / lon_segments as f32 * TAU).sin_cos();
            let n = [sin_theta * cos_phi, sin_theta * sin_phi, cos_theta];
            mesh.push_vertex([n[0] * radius, n[1] * radius, n[2] * radius], n);
        }
    }

    for lat in 0..lat_segments {
        for lon in 0..lon_segments {
            let current = lat * ring + lon;
            let below = current + ring;
            mesh.push_triangle(current, below, current + 1);
            mesh.push_triangle(current + 1, below, below + 1);
        }
    }

    mesh
}
