//! Ray casting against scene geometry
//!
//! Picking runs in two phases: a slab test against the object's world-space
//! bounding box rejects most objects cheaply, then the ray is moved into the
//! object's local space and tested against every triangle.

use glam::{Mat4, Vec3};
use studio_core::Geometry;

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point
    pub origin: Vec3,
    /// Unit direction (zero if constructed from a degenerate vector)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Ray-triangle intersection test (Möller–Trumbore).
///
/// Solves `origin + t * dir = (1 - u - v) * v0 + u * v1 + v * v2` for
/// `(t, u, v)` using Cramer's rule on the edge vectors. Both faces of the
/// triangle are hit.
///
/// # Returns
///
/// * `Some(t)` - Ray parameter of the hit, measured in units of `ray_dir`.
/// * `None` - Parallel ray, hit outside the triangle, or behind the origin.
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let p = ray_dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray_origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray_dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > EPSILON).then_some(t)
}

/// Nearest hit of a world ray against transformed geometry.
///
/// The ray is mapped into object space with the inverse model matrix. The
/// local direction is deliberately left unnormalized so the returned `t` is
/// directly comparable with world-space distances along `ray`.
pub fn ray_geometry_intersection(ray: &Ray, model: &Mat4, geometry: &Geometry) -> Option<f32> {
    let inverse = model.inverse();
    if !inverse.is_finite() {
        return None;
    }
    let local_origin = inverse.transform_point3(ray.origin);
    let local_dir = inverse.transform_vector3(ray.direction);

    geometry
        .triangles()
        .filter_map(|[a, b, c]| ray_triangle_intersection(local_origin, local_dir, a, b, c))
        .min_by(f32::total_cmp)
}
