//! glTF / GLB decoding

use glam::{Mat4, Vec3};

use super::ImportError;
use crate::object::MeshSource;

/// Flatten every triangle primitive of the default scene into one mesh,
/// baking node transforms into the vertex positions
pub(super) fn read(bytes: &[u8]) -> Result<MeshSource, ImportError> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|e| ImportError::Parse(e.to_string()))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(ImportError::EmptyMesh)?;

    let mut out = MeshSource::default();
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &buffers, &mut out);
    }
    Ok(out)
}

fn collect_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut MeshSource,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::debug!("Skipping non-triangle primitive in '{}'", mesh.name().unwrap_or("mesh"));
                continue;
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let offset = out.vertices.len() as u32;
            out.vertices.extend(
                positions.map(|p| world.transform_point3(Vec3::from(p)).to_array()),
            );
            let count = out.vertices.len() as u32 - offset;

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..count).collect(),
            };
            out.faces.extend(
                indices
                    .chunks_exact(3)
                    .map(|t| [offset + t[0], offset + t[1], offset + t[2]]),
            );
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}
