//! STL decoding

use std::collections::HashMap;
use std::io::Cursor;

use super::ImportError;
use crate::constants::STL_VERTEX_PRECISION;
use crate::object::MeshSource;

/// Read ASCII or binary STL, welding vertices that coincide after quantization
pub(super) fn read(bytes: &[u8]) -> Result<MeshSource, ImportError> {
    let mut reader = Cursor::new(bytes);
    let mesh = stl_io::read_stl(&mut reader).map_err(|e| ImportError::Parse(e.to_string()))?;

    let mut vertices: Vec<[f32; 3]> = Vec::with_capacity(mesh.vertices.len());
    let mut welded: HashMap<[i32; 3], u32> = HashMap::new();
    let mut remap: Vec<u32> = Vec::with_capacity(mesh.vertices.len());

    for vertex in &mesh.vertices {
        let v = [vertex[0], vertex[1], vertex[2]];
        let key = [
            (v[0] * STL_VERTEX_PRECISION).round() as i32,
            (v[1] * STL_VERTEX_PRECISION).round() as i32,
            (v[2] * STL_VERTEX_PRECISION).round() as i32,
        ];
        let index = *welded.entry(key).or_insert_with(|| {
            vertices.push(v);
            (vertices.len() - 1) as u32
        });
        remap.push(index);
    }

    let faces = mesh
        .faces
        .iter()
        .map(|face| face.vertices.map(|i| remap[i]))
        // Triangles collapsed by welding carry no area
        .filter(|[a, b, c]| a != b && b != c && a != c)
        .collect();

    Ok(MeshSource::new(vertices, faces))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASCII_TRIANGLE: &str = "solid t
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 0 1 0
  endloop
endfacet
facet normal 0 0 1
  outer loop
    vertex 1 0 0
    vertex 1 1 0
    vertex 0 1 0
  endloop
endfacet
endsolid t
";

    #[test]
    fn test_read_ascii_welds_shared_vertices() {
        let mesh = read(ASCII_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces.len(), 2);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            read(b"definitely not an stl"),
            Err(ImportError::Parse(_))
        ));
    }
}
