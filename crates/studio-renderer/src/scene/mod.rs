//! Scene-space math: bounds and ray casting

mod bounds;
mod ray;

pub use bounds::BoundingBox;
pub use ray::{Ray, ray_geometry_intersection, ray_triangle_intersection};
