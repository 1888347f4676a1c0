//! OBJ decoding

use std::io::Cursor;

use super::ImportError;
use crate::object::MeshSource;

/// Read every model in an OBJ file into one mesh (materials are ignored)
pub(super) fn read(bytes: &[u8]) -> Result<MeshSource, ImportError> {
    let mut cursor = Cursor::new(bytes);
    let (models, _materials) = tobj::load_obj_buf(
        &mut cursor,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Ok(Default::default()),
    )
    .map_err(|e| ImportError::Parse(e.to_string()))?;

    if models.is_empty() {
        return Err(ImportError::EmptyMesh);
    }

    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    for model in &models {
        let mesh = &model.mesh;
        let offset = vertices.len() as u32;
        vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]]),
        );
        indices.extend(mesh.indices.iter().map(|&i| offset + i));
    }

    Ok(MeshSource::from_indexed(vertices, &indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_is_triangulated() {
        let obj = "o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";
        let mesh = read(obj.as_bytes()).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces.len(), 2);
    }

    #[test]
    fn test_multiple_objects_are_merged() {
        let obj = "o a
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o b
v 0 0 1
v 1 0 1
v 0 1 1
f 4 5 6
";
        let mesh = read(obj.as_bytes()).unwrap();
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.faces[1], [3, 4, 5]);
    }
}
