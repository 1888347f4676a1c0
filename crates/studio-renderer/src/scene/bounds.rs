//! Axis-aligned bounding boxes for picking and framing.

use glam::{Mat4, Vec3};
use studio_core::Geometry;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a new bounding box from min and max points.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an empty (inverted) bounding box.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Creates a bounding box from a center point and half-extents.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates a bounding box that contains all given points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |bbox, point| bbox.expand_to_include(point))
    }

    /// Object-space bounds of resolved geometry.
    pub fn from_geometry(geometry: &Geometry) -> Self {
        Self::new(geometry.bbox_min, geometry.bbox_max)
    }

    /// Returns the center of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half-extents of the bounding box.
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns the size (full extents) of the bounding box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest full extent along any axis.
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    /// Returns the radius of the bounding sphere.
    pub fn radius(&self) -> f32 {
        self.half_extents().length()
    }

    /// Returns true if the bounding box contains the given point.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Returns true if this bounding box intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Returns the union of two bounding boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns a new bounding box expanded to include the given point.
    pub fn expand_to_include(&self, point: Vec3) -> BoundingBox {
        BoundingBox {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// The eight corner points.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Transforms the bounding box by the given matrix.
    ///
    /// Returns the axis-aligned box around the transformed corners, which
    /// may be larger than optimal.
    pub fn transform(&self, transform: &Mat4) -> BoundingBox {
        if !self.is_valid() {
            return *self;
        }
        BoundingBox::from_points(self.corners().map(|c| transform.transform_point3(c)))
    }

    /// Returns true if the bounding box is valid (non-empty).
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Returns true if both corners are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Slab test; distance along the ray to the entry point, if hit.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inv = direction.recip();
        let t1 = (self.min - origin) * inv;
        let t2 = (self.max - origin) * inv;
        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();
        if t_near > t_far || t_far < 0.0 {
            None
        } else {
            Some(t_near.max(0.0))
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_center() {
        let bbox = BoundingBox::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.center(), Vec3::ZERO);
        assert_eq!(bbox.half_extents(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.max_extent(), 6.0);
    }

    #[test]
    fn test_bounding_box_union() {
        let a = BoundingBox::new(Vec3::splat(-1.0), Vec3::ZERO);
        let b = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::splat(-1.0));
        assert_eq!(u.max, Vec3::ONE);
    }

    #[test]
    fn test_empty_is_invalid_and_union_neutral() {
        let empty = BoundingBox::empty();
        assert!(!empty.is_valid());
        let b = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(empty.union(&b), b);
        assert_eq!(empty.transform(&Mat4::IDENTITY), empty);
    }

    #[test]
    fn test_transform_translates_corners() {
        let b = BoundingBox::new(Vec3::splat(-1.0), Vec3::ONE);
        let moved = b.transform(&Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(4.0, -1.0, -1.0));
        assert_eq!(moved.max, Vec3::new(6.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_slab() {
        let b = BoundingBox::new(Vec3::splat(-1.0), Vec3::ONE);
        let t = b.intersect_ray(Vec3::new(-5.0, 0.0, 0.0), Vec3::X).unwrap();
        assert_eq!(t, 4.0);
        assert!(b.intersect_ray(Vec3::new(-5.0, 3.0, 0.0), Vec3::X).is_none());
        assert!(b.intersect_ray(Vec3::new(5.0, 0.0, 0.0), Vec3::X).is_none());
    }
}
