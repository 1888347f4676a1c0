//! Global constants for studio-core

/// STL vertex comparison precision (multiply by this, then round to int)
pub const STL_VERTEX_PRECISION: f32 = 10000.0;

/// Default number of segments for cylinder and cone mesh generation
pub const CYLINDER_SEGMENTS: u32 = 32;

/// Default number of latitude segments for sphere mesh generation
pub const SPHERE_LAT_SEGMENTS: u32 = 16;

/// Default number of longitude segments for sphere mesh generation
pub const SPHERE_LON_SEGMENTS: u32 = 32;

/// Segments around the torus ring
pub const TORUS_RADIAL_SEGMENTS: u32 = 48;

/// Segments around the torus tube
pub const TORUS_TUBULAR_SEGMENTS: u32 = 16;

/// Default cube side length
pub const DEFAULT_CUBE_SIZE: f32 = 4.0;

/// Default sphere radius
pub const DEFAULT_SPHERE_RADIUS: f32 = 2.0;

/// Default cylinder / cone radius
pub const DEFAULT_CYLINDER_RADIUS: f32 = 1.5;

/// Default cylinder / cone height
pub const DEFAULT_CYLINDER_HEIGHT: f32 = 4.0;

/// Default torus ring radius
pub const DEFAULT_TORUS_RADIUS: f32 = 2.0;

/// Default torus tube radius
pub const DEFAULT_TORUS_TUBE: f32 = 0.5;

/// Side length of the box used when a mesh payload is missing
pub const FALLBACK_BOX_SIZE: f32 = 1.0;

/// Default number of entries kept in the modification history
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Named selection target that resolves to the base model
pub const MAIN_TARGET: &str = "main";
