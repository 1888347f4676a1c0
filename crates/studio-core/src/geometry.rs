//! Renderable geometry and the primitive factory

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::object::MeshSource;
use crate::primitive::{
    MeshData, generate_box_mesh, generate_cone_mesh, generate_cylinder_mesh, generate_sphere_mesh,
    generate_torus_mesh,
};

/// Indexed triangle geometry in object space
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub bbox_min: Vec3,
    pub bbox_max: Vec3,
}

impl Geometry {
    /// Build geometry from generated mesh data
    pub fn from_mesh_data(mesh: MeshData) -> Self {
        let (bbox_min, bbox_max) = compute_bounds(&mesh.positions);
        Self {
            positions: mesh.positions,
            normals: mesh.normals,
            indices: mesh.indices,
            bbox_min,
            bbox_max,
        }
    }

    /// Build an indexed mesh from raw vertex/face arrays, computing smooth normals
    ///
    /// Faces referencing out-of-range vertices are dropped.
    pub fn from_source(source: &MeshSource) -> Option<Self> {
        if source.is_empty() {
            return None;
        }
        let vertex_count = source.vertices.len() as u32;
        let indices: Vec<u32> = source
            .faces
            .iter()
            .filter(|face| face.iter().all(|&i| i < vertex_count))
            .flatten()
            .copied()
            .collect();
        if indices.is_empty() {
            return None;
        }
        let normals = compute_vertex_normals(&source.vertices, &indices);
        let (bbox_min, bbox_max) = compute_bounds(&source.vertices);
        Some(Self {
            positions: source.vertices.clone(),
            normals,
            indices,
            bbox_min,
            bbox_max,
        })
    }

    /// Unit-ish box used when an object's geometry cannot be resolved
    pub fn fallback_box() -> Self {
        Self::from_mesh_data(generate_box_mesh([FALLBACK_BOX_SIZE; 3]))
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                Vec3::from(self.positions[tri[0] as usize]),
                Vec3::from(self.positions[tri[1] as usize]),
                Vec3::from(self.positions[tri[2] as usize]),
            ]
        })
    }

    /// Line-list indices for every unique triangle edge (wireframe display)
    pub fn edge_indices(&self) -> Vec<u32> {
        let mut seen = std::collections::HashSet::new();
        let mut lines = Vec::with_capacity(self.indices.len() * 2);
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    lines.extend_from_slice(&[a, b]);
                }
            }
        }
        lines
    }
}

fn compute_bounds(positions: &[[f32; 3]]) -> (Vec3, Vec3) {
    positions.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(min, max), p| {
            let p = Vec3::from(*p);
            (min.min(p), max.max(p))
        },
    )
}

/// Area-weighted smooth vertex normals
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(pa), Some(pb), Some(pc)) = (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let (pa, pb, pc) = (Vec3::from(*pa), Vec3::from(*pb), Vec3::from(*pc));
        // Unnormalized cross product weights by triangle area
        let face = (pb - pa).cross(pc - pa);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }
    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Z).to_array())
        .collect()
}

/// Calculate the unit normal of a single triangle
pub fn triangle_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0).try_normalize().unwrap_or(Vec3::Z)
}

/// Primitive kind tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Cube,
    Sphere,
    Cylinder,
    Cone,
    Torus,
    /// Any other tag (custom meshes, `ai_*` shapes)
    Other(String),
}

impl PrimitiveKind {
    /// Parse a type tag, case-insensitively
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "cube" | "box" => Self::Cube,
            "sphere" => Self::Sphere,
            "cylinder" => Self::Cylinder,
            "cone" => Self::Cone,
            "torus" => Self::Torus,
            _ => Self::Other(tag.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Cone => "cone",
            Self::Torus => "torus",
            Self::Other(tag) => tag,
        }
    }

    /// Built-in procedural kinds
    pub const BUILTIN: [PrimitiveKind; 5] = [
        PrimitiveKind::Cube,
        PrimitiveKind::Sphere,
        PrimitiveKind::Cylinder,
        PrimitiveKind::Cone,
        PrimitiveKind::Torus,
    ];
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PrimitiveKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PrimitiveKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::parse(&tag))
    }
}

/// Optional size parameters; missing values fall back to per-kind defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tube: Option<f32>,
}

impl SizeParameters {
    pub fn cube(size: f32) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self {
            radius: Some(radius),
            ..Default::default()
        }
    }

    /// Ignore non-finite and non-positive values so a default applies instead
    fn get(value: Option<f32>, default: f32) -> f32 {
        value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
    }

    pub fn cube_size(&self) -> f32 {
        Self::get(self.size, DEFAULT_CUBE_SIZE)
    }

    pub fn sphere_radius(&self) -> f32 {
        Self::get(self.radius, DEFAULT_SPHERE_RADIUS)
    }

    pub fn cylinder_radius(&self) -> f32 {
        Self::get(self.radius, DEFAULT_CYLINDER_RADIUS)
    }

    pub fn cylinder_height(&self) -> f32 {
        Self::get(self.height, DEFAULT_CYLINDER_HEIGHT)
    }

    pub fn torus_radius(&self) -> f32 {
        Self::get(self.radius, DEFAULT_TORUS_RADIUS)
    }

    pub fn torus_tube(&self) -> f32 {
        Self::get(self.tube, DEFAULT_TORUS_TUBE)
    }
}

/// Input to [`create_primitive`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveSpec {
    #[serde(rename = "primitive")]
    pub kind: PrimitiveKind,
    #[serde(default)]
    pub size: SizeParameters,
    /// Raw buffer geometry for non-procedural kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<std::sync::Arc<MeshSource>>,
    /// Prompt that produced an AI-generated shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Requested object id (generated when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Initial world position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
}

impl PrimitiveSpec {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            size: SizeParameters::default(),
            mesh: None,
            prompt: None,
            id: None,
            position: None,
        }
    }

    pub fn with_size(mut self, size: SizeParameters) -> Self {
        self.size = size;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshSource) -> Self {
        self.mesh = Some(std::sync::Arc::new(mesh));
        self
    }

    pub fn at(mut self, position: [f32; 3]) -> Self {
        self.position = Some(position);
        self
    }
}

/// Build geometry for a primitive spec
///
/// Returns `None` (and logs a warning) for unknown kinds that carry no
/// usable mesh payload; the caller decides on a fallback.
pub fn create_primitive(spec: &PrimitiveSpec) -> Option<Geometry> {
    let size = &spec.size;
    let mesh = match &spec.kind {
        PrimitiveKind::Cube => generate_box_mesh([size.cube_size(); 3]),
        PrimitiveKind::Sphere => generate_sphere_mesh(size.sphere_radius()),
        PrimitiveKind::Cylinder => {
            generate_cylinder_mesh(size.cylinder_radius(), size.cylinder_height())
        }
        PrimitiveKind::Cone => generate_cone_mesh(size.cylinder_radius(), size.cylinder_height()),
        PrimitiveKind::Torus => generate_torus_mesh(size.torus_radius(), size.torus_tube()),
        PrimitiveKind::Other(tag) => {
            let geometry = spec.mesh.as_deref().and_then(Geometry::from_source);
            if geometry.is_none() {
                tracing::warn!("Unknown primitive '{}' without mesh data", tag);
            }
            return geometry;
        }
    };
    Some(Geometry::from_mesh_data(mesh))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_default_cube_size() {
        let geometry = create_primitive(&PrimitiveSpec::new(PrimitiveKind::Cube)).unwrap();
        let size = geometry.bbox_max - geometry.bbox_min;
        assert_relative_eq!(size.x, 4.0, epsilon = 1e-5);
        assert_relative_eq!(size.z, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_default_sphere_radius() {
        let geometry = create_primitive(&PrimitiveSpec::new(PrimitiveKind::Sphere)).unwrap();
        assert_relative_eq!(geometry.bbox_max.z, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_invalid_size_falls_back_to_default() {
        let spec = PrimitiveSpec::new(PrimitiveKind::Cube).with_size(SizeParameters::cube(-1.0));
        let geometry = create_primitive(&spec).unwrap();
        assert_relative_eq!(geometry.bbox_max.x, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_unknown_kind_without_mesh() {
        let spec = PrimitiveSpec::new(PrimitiveKind::parse("ai_chair"));
        assert!(create_primitive(&spec).is_none());
    }

    #[test]
    fn test_unknown_kind_with_mesh() {
        let mesh = MeshSource::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 2]],
        );
        let spec = PrimitiveSpec::new(PrimitiveKind::parse("ai_chair")).with_mesh(mesh);
        let geometry = create_primitive(&spec).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
        assert_eq!(geometry.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_out_of_range_faces_dropped() {
        let mesh = MeshSource::new(vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![[0, 1, 5]]);
        assert!(Geometry::from_source(&mesh).is_none());
    }

    #[test]
    fn test_kind_parse_roundtrip() {
        assert_eq!(PrimitiveKind::parse("Cube"), PrimitiveKind::Cube);
        assert_eq!(PrimitiveKind::parse("torus").as_str(), "torus");
        assert_eq!(
            PrimitiveKind::parse("ai_vase"),
            PrimitiveKind::Other("ai_vase".into())
        );
    }

    #[test]
    fn test_edge_indices_unique() {
        let geometry = Geometry::from_mesh_data(generate_box_mesh([1.0; 3]));
        // 6 faces * (4 outer edges + 1 diagonal)
        assert_eq!(geometry.edge_indices().len(), 6 * 5 * 2);
    }
}
