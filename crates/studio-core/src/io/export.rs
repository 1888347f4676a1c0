//! STL and OBJ writers over scene objects

use std::fmt::Write as _;
use std::io::Cursor;

use glam::Vec3;

use super::ExportError;
use crate::geometry::{Geometry, triangle_normal};
use crate::object::SceneObject;

/// Object geometry with its transform applied
fn world_geometry(object: &SceneObject) -> Geometry {
    let matrix = object.model_matrix();
    let normal_matrix = matrix.inverse().transpose();
    let mut geometry = object.geometry();
    for p in &mut geometry.positions {
        *p = matrix.transform_point3(Vec3::from(*p)).to_array();
    }
    for n in &mut geometry.normals {
        *n = normal_matrix
            .transform_vector3(Vec3::from(*n))
            .try_normalize()
            .unwrap_or(Vec3::Z)
            .to_array();
    }
    geometry
}

/// Binary STL of the given objects in world space
pub fn export_stl<'a>(
    objects: impl IntoIterator<Item = &'a SceneObject>,
) -> Result<Vec<u8>, ExportError> {
    let mut triangles = Vec::new();
    for object in objects {
        let geometry = world_geometry(object);
        triangles.extend(geometry.triangles().map(|[v0, v1, v2]| stl_io::Triangle {
            normal: stl_io::Normal::new(triangle_normal(v0, v1, v2).to_array()),
            vertices: [
                stl_io::Vertex::new(v0.to_array()),
                stl_io::Vertex::new(v1.to_array()),
                stl_io::Vertex::new(v2.to_array()),
            ],
        }));
    }
    if triangles.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut cursor = Cursor::new(Vec::new());
    stl_io::write_stl(&mut cursor, triangles.iter())
        .map_err(|e| ExportError::Write(e.to_string()))?;
    tracing::debug!("Exported {} triangles as STL", triangles.len());
    Ok(cursor.into_inner())
}

/// Wavefront OBJ text of one object in world space
pub fn export_obj(object: &SceneObject) -> Result<Vec<u8>, ExportError> {
    let geometry = world_geometry(object);
    if geometry.triangle_count() == 0 {
        return Err(ExportError::Empty);
    }

    let mut out = String::new();
    let write = |e: std::fmt::Error| ExportError::Write(e.to_string());
    writeln!(out, "o {}", object.name.replace(char::is_whitespace, "_")).map_err(write)?;
    for [x, y, z] in &geometry.positions {
        writeln!(out, "v {} {} {}", x, y, z).map_err(write)?;
    }
    for [x, y, z] in &geometry.normals {
        writeln!(out, "vn {} {} {}", x, y, z).map_err(write)?;
    }
    for tri in geometry.indices.chunks_exact(3) {
        // OBJ indices are 1-based; normals share vertex indices
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}").map_err(write)?;
    }
    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{MeshFormat, import_bytes};
    use crate::object::{Shape, Transform};

    fn moved_cube() -> SceneObject {
        SceneObject::new(Shape::Cube { size: 2.0 })
            .with_transform(Transform::from_position(Vec3::new(10.0, 0.0, 0.0)))
    }

    #[test]
    fn test_stl_is_in_world_space() {
        let bytes = export_stl([&moved_cube()]).unwrap();
        // 80 byte header + count + 50 bytes per triangle
        assert_eq!(bytes.len(), 84 + 12 * 50);
        let mesh = import_bytes(&bytes, MeshFormat::Stl).unwrap();
        let min_x = mesh.vertices.iter().map(|v| v[0]).fold(f32::INFINITY, f32::min);
        assert!((min_x - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_scene_is_error() {
        assert_eq!(export_stl(std::iter::empty()), Err(ExportError::Empty));
    }

    #[test]
    fn test_obj_roundtrip_counts() {
        let bytes = export_obj(&moved_cube()).unwrap();
        let mesh = import_bytes(&bytes, MeshFormat::Obj).unwrap();
        assert_eq!(mesh.faces.len(), 12);
    }
}
