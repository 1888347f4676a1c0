//! Scene object model

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Geometry, PrimitiveKind, PrimitiveSpec, SizeParameters, create_primitive};
use crate::material::Material;
use crate::scalar_field::ScalarField;

/// Stable, immutable object identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw buffer geometry: vertex positions and triangle faces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshSource {
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
}

impl MeshSource {
    pub fn new(vertices: Vec<[f32; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Build from a flat triangle index list (trailing partial triangles are dropped)
    pub fn from_indexed(vertices: Vec<[f32; 3]>, indices: &[u32]) -> Self {
        let faces = indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();
        Self { vertices, faces }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    pub fn stats(&self) -> MeshStats {
        MeshStats {
            vertex_count: self.vertices.len(),
            face_count: self.faces.len(),
        }
    }
}

/// Vertex and face counts reported after remediation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshStats {
    pub vertex_count: usize,
    pub face_count: usize,
}

/// Boolean operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOp {
    Union,
    Subtract,
    Intersect,
}

impl BooleanOp {
    pub fn name(&self) -> &'static str {
        match self {
            BooleanOp::Union => "union",
            BooleanOp::Subtract => "subtract",
            BooleanOp::Intersect => "intersect",
        }
    }
}

/// Geometry construction policy of an object
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Cube {
        size: f32,
    },
    Sphere {
        radius: f32,
    },
    Cylinder {
        radius: f32,
        height: f32,
    },
    Cone {
        radius: f32,
        height: f32,
    },
    Torus {
        radius: f32,
        tube: f32,
    },
    /// Loaded or uploaded mesh
    Mesh {
        source: Option<String>,
        mesh: Option<Arc<MeshSource>>,
    },
    /// Result of a boolean operation computed remotely
    Boolean {
        operation: BooleanOp,
        mesh: Option<Arc<MeshSource>>,
    },
    /// Robot description loaded as the base model
    Urdf {
        source: String,
        mesh: Option<Arc<MeshSource>>,
    },
    /// AI-generated shape, `kind` without the `ai_` prefix
    Ai {
        kind: String,
        prompt: Option<String>,
        mesh: Option<Arc<MeshSource>>,
    },
}

impl Shape {
    /// Resolve the shape a primitive spec describes, applying default sizes
    pub fn from_spec(spec: &PrimitiveSpec) -> Self {
        let size = &spec.size;
        match &spec.kind {
            PrimitiveKind::Cube => Shape::Cube {
                size: size.cube_size(),
            },
            PrimitiveKind::Sphere => Shape::Sphere {
                radius: size.sphere_radius(),
            },
            PrimitiveKind::Cylinder => Shape::Cylinder {
                radius: size.cylinder_radius(),
                height: size.cylinder_height(),
            },
            PrimitiveKind::Cone => Shape::Cone {
                radius: size.cylinder_radius(),
                height: size.cylinder_height(),
            },
            PrimitiveKind::Torus => Shape::Torus {
                radius: size.torus_radius(),
                tube: size.torus_tube(),
            },
            PrimitiveKind::Other(tag) => match tag.strip_prefix("ai_") {
                Some(kind) => Shape::Ai {
                    kind: kind.to_string(),
                    prompt: spec.prompt.clone(),
                    mesh: spec.mesh.clone(),
                },
                None => Shape::Mesh {
                    source: Some(tag.clone()),
                    mesh: spec.mesh.clone(),
                },
            },
        }
    }

    /// Type tag: `cube|sphere|cylinder|cone|torus|mesh|boolean|urdf|ai_<kind>`
    pub fn type_tag(&self) -> String {
        match self {
            Shape::Cube { .. } => "cube".into(),
            Shape::Sphere { .. } => "sphere".into(),
            Shape::Cylinder { .. } => "cylinder".into(),
            Shape::Cone { .. } => "cone".into(),
            Shape::Torus { .. } => "torus".into(),
            Shape::Mesh { .. } => "mesh".into(),
            Shape::Boolean { .. } => "boolean".into(),
            Shape::Urdf { .. } => "urdf".into(),
            Shape::Ai { kind, .. } => format!("ai_{}", kind),
        }
    }

    /// Mesh payload for buffer-geometry shapes
    pub fn mesh(&self) -> Option<&Arc<MeshSource>> {
        match self {
            Shape::Mesh { mesh, .. }
            | Shape::Boolean { mesh, .. }
            | Shape::Urdf { mesh, .. }
            | Shape::Ai { mesh, .. } => mesh.as_ref(),
            _ => None,
        }
    }

    /// Replace the mesh payload; procedural shapes become plain meshes
    pub fn with_mesh(self, new_mesh: Arc<MeshSource>) -> Self {
        match self {
            Shape::Mesh { source, .. } => Shape::Mesh {
                source,
                mesh: Some(new_mesh),
            },
            Shape::Boolean { operation, .. } => Shape::Boolean {
                operation,
                mesh: Some(new_mesh),
            },
            Shape::Urdf { source, .. } => Shape::Urdf {
                source,
                mesh: Some(new_mesh),
            },
            Shape::Ai { kind, prompt, .. } => Shape::Ai {
                kind,
                prompt,
                mesh: Some(new_mesh),
            },
            other => Shape::Mesh {
                source: Some(other.type_tag()),
                mesh: Some(new_mesh),
            },
        }
    }

    fn primitive_spec(&self) -> Option<PrimitiveSpec> {
        let (kind, size) = match *self {
            Shape::Cube { size } => (PrimitiveKind::Cube, SizeParameters::cube(size)),
            Shape::Sphere { radius } => (PrimitiveKind::Sphere, SizeParameters::sphere(radius)),
            Shape::Cylinder { radius, height } => (
                PrimitiveKind::Cylinder,
                SizeParameters {
                    radius: Some(radius),
                    height: Some(height),
                    ..Default::default()
                },
            ),
            Shape::Cone { radius, height } => (
                PrimitiveKind::Cone,
                SizeParameters {
                    radius: Some(radius),
                    height: Some(height),
                    ..Default::default()
                },
            ),
            Shape::Torus { radius, tube } => (
                PrimitiveKind::Torus,
                SizeParameters {
                    radius: Some(radius),
                    tube: Some(tube),
                    ..Default::default()
                },
            ),
            _ => return None,
        };
        Some(PrimitiveSpec::new(kind).with_size(size))
    }

    /// Build object-space geometry; mesh shapes without data fall back to a box
    pub fn geometry(&self) -> Geometry {
        if let Some(spec) = self.primitive_spec()
            && let Some(geometry) = create_primitive(&spec)
        {
            return geometry;
        }
        match self.mesh().and_then(|m| Geometry::from_source(m)) {
            Some(geometry) => geometry,
            None => {
                tracing::warn!(
                    "Shape '{}' has no usable vertices/faces, using fallback box",
                    self.type_tag()
                );
                Geometry::fallback_box()
            }
        }
    }

    /// Half extents estimated from shape parameters alone
    ///
    /// Used for framing before geometry has been resolved.
    pub fn approximate_half_extents(&self) -> Vec3 {
        match *self {
            Shape::Cube { size } => Vec3::splat(size / 2.0),
            Shape::Sphere { radius } => Vec3::splat(radius),
            Shape::Cylinder { radius, height } | Shape::Cone { radius, height } => {
                Vec3::new(radius, radius, height / 2.0)
            }
            Shape::Torus { radius, tube } => Vec3::new(radius + tube, radius + tube, tube),
            _ => match self.mesh() {
                Some(mesh) if !mesh.vertices.is_empty() => {
                    let (min, max) = mesh.vertices.iter().fold(
                        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
                        |(lo, hi), v| (lo.min(Vec3::from(*v)), hi.max(Vec3::from(*v))),
                    );
                    // Offset meshes are approximated around the origin
                    min.abs().max(max.abs())
                }
                _ => Vec3::splat(crate::constants::FALLBACK_BOX_SIZE / 2.0),
            },
        }
    }
}

/// Position, rotation and scale in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Rotation as XYZ Euler angles in radians
    pub fn euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    pub fn set_euler(&mut self, euler: Vec3) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
    }
}

static REVISION: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique geometry revision
pub fn next_geometry_revision() -> u64 {
    REVISION.fetch_add(1, Ordering::Relaxed)
}

/// One entry in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub shape: Shape,
    pub transform: Transform,
    pub material: Material,
    pub stats: Option<MeshStats>,
    pub scalar_field: Option<ScalarField>,
    /// Changes whenever the geometry source changes
    pub geometry_revision: u64,
}

impl SceneObject {
    pub fn new(shape: Shape) -> Self {
        let name = shape.type_tag();
        Self {
            id: ObjectId::generate(),
            name,
            stats: shape.mesh().map(|m| m.stats()),
            shape,
            transform: Transform::IDENTITY,
            material: Material::default(),
            scalar_field: None,
            geometry_revision: next_geometry_revision(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ObjectId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Swap in new mesh data (e.g. after remediation) and bump the revision
    pub fn replace_mesh(&mut self, mesh: Arc<MeshSource>) {
        self.stats = Some(mesh.stats());
        let shape = std::mem::replace(&mut self.shape, Shape::Cube { size: 0.0 });
        self.shape = shape.with_mesh(mesh);
        self.touch_geometry();
    }

    pub fn set_scalar_field(&mut self, field: Option<ScalarField>) {
        self.scalar_field = field;
        self.touch_geometry();
    }

    pub fn touch_geometry(&mut self) {
        self.geometry_revision = next_geometry_revision();
    }

    pub fn geometry(&self) -> Geometry {
        self.shape.geometry()
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.transform.matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        let ai = Shape::from_spec(&PrimitiveSpec::new(PrimitiveKind::parse("ai_chair")));
        assert_eq!(ai.type_tag(), "ai_chair");
        let cone = Shape::from_spec(&PrimitiveSpec::new(PrimitiveKind::Cone));
        assert_eq!(cone.type_tag(), "cone");
        assert_eq!(
            cone,
            Shape::Cone {
                radius: 1.5,
                height: 4.0
            }
        );
    }

    #[test]
    fn test_mesh_without_data_uses_fallback_box() {
        let shape = Shape::Mesh {
            source: None,
            mesh: None,
        };
        let geometry = shape.geometry();
        assert_eq!(geometry.vertex_count(), 24);
    }

    #[test]
    fn test_replace_mesh_bumps_revision() {
        let mut object = SceneObject::new(Shape::Cube { size: 1.0 });
        let before = object.geometry_revision;
        object.replace_mesh(Arc::new(MeshSource::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 2]],
        )));
        assert_ne!(before, object.geometry_revision);
        assert_eq!(object.stats.unwrap().face_count, 1);
        assert_eq!(object.shape.type_tag(), "mesh");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = SceneObject::new(Shape::Sphere { radius: 1.0 });
        let b = SceneObject::new(Shape::Sphere { radius: 1.0 });
        assert_ne!(a.id, b.id);
    }
}
